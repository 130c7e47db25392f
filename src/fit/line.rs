use std::fmt;

use tracing::{debug, warn};

use crate::config::FitConfig;
use crate::error::{FitError, Result};
use crate::math::moments::centroid_and_covariance;
use crate::math::principal_axis::line_direction;
use crate::math::{distance, rms, Point3, UnitVector3};

/// A best-fit or exact 3D line.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineFit {
    /// Point on the line: the centroid for least-squares fits, the first
    /// input point for the 2-point construction.
    pub point: Point3,
    /// Unit direction.
    pub direction: UnitVector3,
    /// RMS perpendicular distance of the input points to the line.
    pub residual: f64,
    /// Number of points the line was fitted to.
    pub point_count: usize,
}

impl LineFit {
    /// Orthogonal projection of `point` onto the line.
    #[must_use]
    pub fn project(&self, point: &Point3) -> Point3 {
        let t = self.direction.dot(&(point - self.point));
        self.point + self.direction.into_inner() * t
    }

    /// Perpendicular distance from `point` to the line.
    #[must_use]
    pub fn distance_to(&self, point: &Point3) -> f64 {
        distance(point, &self.project(point))
    }
}

impl fmt::Display for LineFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Point: ({:.3}, {:.3}, {:.3}) mm, Direction: ({:.4}, {:.4}, {:.4}), Residual: {:.4} mm",
            self.point.x,
            self.point.y,
            self.point.z,
            self.direction.x,
            self.direction.y,
            self.direction.z,
            self.residual
        )
    }
}

/// Best-fit line through two or more points.
///
/// The line passes through the centroid; the direction is the covariance
/// matrix's dominant axis, see [`AxisMethod`](crate::AxisMethod).
pub struct FitLine<'a> {
    points: &'a [Point3],
    config: FitConfig,
}

impl<'a> FitLine<'a> {
    /// Minimum number of points accepted.
    pub const MIN_POINTS: usize = 2;

    /// Creates a new `FitLine` operation.
    #[must_use]
    pub fn new(points: &'a [Point3]) -> Self {
        Self {
            points,
            config: FitConfig::default(),
        }
    }

    /// Overrides the default configuration.
    #[must_use]
    pub fn with_config(mut self, config: FitConfig) -> Self {
        self.config = config;
        self
    }

    /// Executes the fit.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::InsufficientPoints`] for fewer than two points and
    /// [`FitError::CoincidentPoints`] if all points coincide.
    pub fn execute(&self) -> Result<LineFit> {
        let n = self.points.len();
        if n < Self::MIN_POINTS {
            return Err(FitError::InsufficientPoints {
                required: Self::MIN_POINTS,
                actual: n,
            }
            .into());
        }

        let (centroid, cov) =
            centroid_and_covariance(self.points).ok_or(FitError::InsufficientPoints {
                required: Self::MIN_POINTS,
                actual: n,
            })?;

        let Some(direction) =
            line_direction(&cov, self.config.axis_method, self.config.tolerance)
        else {
            warn!(points = n, "line fit rejected: all points coincide");
            return Err(FitError::CoincidentPoints.into());
        };

        // Perpendicular remainder of each centred point.
        let residual = rms(self.points.iter().map(|p| {
            let offset = p - centroid;
            (offset - direction.into_inner() * direction.dot(&offset)).norm()
        }));

        debug!(
            points = n,
            dx = direction.x,
            dy = direction.y,
            dz = direction.z,
            residual,
            "fitted line"
        );

        Ok(LineFit {
            point: centroid,
            direction,
            residual,
            point_count: n,
        })
    }
}

/// Exact line through exactly two points, anchored at the first.
pub struct LineFrom2Points<'a> {
    points: &'a [Point3],
    config: FitConfig,
}

impl<'a> LineFrom2Points<'a> {
    /// Creates a new `LineFrom2Points` operation.
    #[must_use]
    pub fn new(points: &'a [Point3]) -> Self {
        Self {
            points,
            config: FitConfig::default(),
        }
    }

    /// Overrides the default configuration.
    #[must_use]
    pub fn with_config(mut self, config: FitConfig) -> Self {
        self.config = config;
        self
    }

    /// Executes the construction. The residual is always `0`.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::WrongPointCount`] unless exactly two points are
    /// given, and [`FitError::CoincidentPoints`] if they are closer than the
    /// tolerance.
    pub fn execute(&self) -> Result<LineFit> {
        let [p1, p2] = self.points else {
            return Err(FitError::WrongPointCount {
                expected: 2,
                actual: self.points.len(),
            }
            .into());
        };

        let len = distance(p1, p2);
        if len < self.config.tolerance {
            warn!(length = len, "2-point line rejected: coincident points");
            return Err(FitError::CoincidentPoints.into());
        }
        let direction = UnitVector3::new_unchecked((p2 - p1) / len);

        debug!(length = len, "constructed 2-point line");

        Ok(LineFit {
            point: *p1,
            direction,
            residual: 0.0,
            point_count: 2,
        })
    }
}
