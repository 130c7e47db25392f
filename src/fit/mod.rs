mod circle;
mod line;
mod plane;

pub use circle::{CircleFit, CircleFrom3Points, FitCircle};
pub use line::{FitLine, LineFit, LineFrom2Points};
pub use plane::{FitPlane, PlaneEquation, PlaneFit};

use std::fmt;
use std::str::FromStr;

use crate::config::FitConfig;
use crate::error::{ProbefitError, Result};
use crate::math::Point3;

/// The primitive a point set is fitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitKind {
    Circle,
    Plane,
    Line,
}

impl FitKind {
    /// Smallest point count the kind accepts.
    #[must_use]
    pub const fn min_points(self) -> usize {
        match self {
            Self::Circle => FitCircle::MIN_POINTS,
            Self::Plane => FitPlane::MIN_POINTS,
            Self::Line => FitLine::MIN_POINTS,
        }
    }

    /// Upper-case label used when results are stored.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Circle => "CIRCLE",
            Self::Plane => "PLANE",
            Self::Line => "LINE",
        }
    }
}

impl fmt::Display for FitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FitKind {
    type Err = ProbefitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CIRCLE" => Ok(Self::Circle),
            "PLANE" => Ok(Self::Plane),
            "LINE" => Ok(Self::Line),
            _ => Err(ProbefitError::UnknownKind(s.to_owned())),
        }
    }
}

/// Result of [`fit`], one variant per [`FitKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Fitted {
    Circle(CircleFit),
    Plane(PlaneFit),
    Line(LineFit),
}

impl Fitted {
    #[must_use]
    pub fn kind(&self) -> FitKind {
        match self {
            Self::Circle(_) => FitKind::Circle,
            Self::Plane(_) => FitKind::Plane,
            Self::Line(_) => FitKind::Line,
        }
    }

    #[must_use]
    pub fn residual(&self) -> f64 {
        match self {
            Self::Circle(c) => c.residual,
            Self::Plane(p) => p.residual,
            Self::Line(l) => l.residual,
        }
    }

    #[must_use]
    pub fn point_count(&self) -> usize {
        match self {
            Self::Circle(c) => c.point_count,
            Self::Plane(p) => p.point_count,
            Self::Line(l) => l.point_count,
        }
    }
}

impl fmt::Display for Fitted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Circle(c) => write!(f, "{}: {c}", self.kind()),
            Self::Plane(p) => write!(f, "{}: {p}", self.kind()),
            Self::Line(l) => write!(f, "{}: {l}", self.kind()),
        }
    }
}

/// Fits `points` to the requested primitive.
///
/// A line through exactly two points uses the exact [`LineFrom2Points`]
/// construction (anchored at the first point); every other case runs the
/// least-squares fit.
///
/// # Errors
///
/// Propagates the error of the selected operation.
pub fn fit(kind: FitKind, points: &[Point3], config: FitConfig) -> Result<Fitted> {
    match kind {
        FitKind::Circle => FitCircle::new(points)
            .with_config(config)
            .execute()
            .map(Fitted::Circle),
        FitKind::Plane => FitPlane::new(points)
            .with_config(config)
            .execute()
            .map(Fitted::Plane),
        FitKind::Line if points.len() == 2 => LineFrom2Points::new(points)
            .with_config(config)
            .execute()
            .map(Fitted::Line),
        FitKind::Line => FitLine::new(points)
            .with_config(config)
            .execute()
            .map(Fitted::Line),
    }
}
