use std::fmt;

use tracing::{debug, warn};

use crate::config::FitConfig;
use crate::error::{FitError, Result};
use crate::math::moments::CircleMoments;
use crate::math::{distance_2d, rms, Point3};

/// A circle fitted in the XY plane.
///
/// `center.z` is the mean height of the input points; the radius and
/// residual only consider x and y.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CircleFit {
    /// Circle center.
    pub center: Point3,
    /// Radius, never negative.
    pub radius: f64,
    /// RMS of `distance_to_center - radius` over the input points.
    pub residual: f64,
    /// Number of points the circle was fitted to.
    pub point_count: usize,
}

impl CircleFit {
    /// Returns the circle diameter.
    #[must_use]
    pub fn diameter(&self) -> f64 {
        2.0 * self.radius
    }

    /// Signed radial deviation of `point` from the circle in the XY plane.
    ///
    /// Positive outside the circle, negative inside.
    #[must_use]
    pub fn radial_deviation(&self, point: &Point3) -> f64 {
        distance_2d(&self.center, point) - self.radius
    }
}

impl fmt::Display for CircleFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Center: ({:.3}, {:.3}) mm, Radius: {:.3} mm, Residual: {:.4} mm",
            self.center.x, self.center.y, self.radius, self.residual
        )
    }
}

/// Least-squares circle through three or more points (algebraic Kåsa fit).
///
/// Solves the 2x2 normal equations of the x/y power sums for the center,
/// then takes the RMS distance to the center as the radius.
pub struct FitCircle<'a> {
    points: &'a [Point3],
    config: FitConfig,
}

impl<'a> FitCircle<'a> {
    /// Minimum number of points accepted.
    pub const MIN_POINTS: usize = 3;

    /// Creates a new `FitCircle` operation.
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
    /// Returns [`FitError::InsufficientPoints`] for fewer than three points
    /// and [`FitError::CollinearPoints`] if the normal equations are singular.
    pub fn execute(&self) -> Result<CircleFit> {
        let n = self.points.len();
        if n < Self::MIN_POINTS {
            return Err(FitError::InsufficientPoints {
                required: Self::MIN_POINTS,
                actual: n,
            }
            .into());
        }

        let moments = CircleMoments::from_points(self.points);
        let equations = moments.normal_equations();
        let Some((cx, cy)) = equations.solve(self.config.tolerance) else {
            warn!(
                points = n,
                determinant = equations.determinant(),
                "circle fit rejected: collinear points"
            );
            return Err(FitError::CollinearPoints.into());
        };

        let center = Point3::new(cx, cy, moments.mean_z());
        let radius = rms(self.points.iter().map(|p| distance_2d(&center, p)));
        let residual = rms(self.points.iter().map(|p| distance_2d(&center, p) - radius));

        debug!(points = n, radius, residual, "fitted circle");

        Ok(CircleFit {
            center,
            radius,
            residual,
            point_count: n,
        })
    }
}

/// Exact circle through exactly three points (circumcircle in XY).
pub struct CircleFrom3Points<'a> {
    points: &'a [Point3],
    config: FitConfig,
}

impl<'a> CircleFrom3Points<'a> {
    /// Creates a new `CircleFrom3Points` operation.
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
    /// Returns [`FitError::WrongPointCount`] unless exactly three points are
    /// given, and [`FitError::CollinearPoints`] if they are collinear in XY.
    pub fn execute(&self) -> Result<CircleFit> {
        let [p1, p2, p3] = self.points else {
            return Err(FitError::WrongPointCount {
                expected: 3,
                actual: self.points.len(),
            }
            .into());
        };

        let ax = p2.x - p1.x;
        let ay = p2.y - p1.y;
        let bx = p3.x - p1.x;
        let by = p3.y - p1.y;

        let denom = 2.0 * (ax * by - ay * bx);
        if denom.abs() < self.config.tolerance {
            warn!(denominator = denom, "3-point circle rejected: collinear points");
            return Err(FitError::CollinearPoints.into());
        }

        let a2 = ax * ax + ay * ay;
        let b2 = bx * bx + by * by;

        let center = Point3::new(
            p1.x + (by * a2 - ay * b2) / denom,
            p1.y + (ax * b2 - bx * a2) / denom,
            (p1.z + p2.z + p3.z) / 3.0,
        );
        let radius = distance_2d(p1, &center);

        debug!(radius, "constructed 3-point circle");

        Ok(CircleFit {
            center,
            radius,
            residual: 0.0,
            point_count: 3,
        })
    }
}
