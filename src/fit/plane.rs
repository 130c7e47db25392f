use std::fmt;

use tracing::{debug, warn};

use crate::config::FitConfig;
use crate::error::{FitError, Result};
use crate::math::moments::centroid_and_covariance;
use crate::math::principal_axis::plane_normal;
use crate::math::{rms, Point3, UnitVector3};

/// Implicit plane `a*x + b*y + c*z + d = 0`.
///
/// `(a, b, c)` is a unit vector, so [`PlaneEquation::evaluate`] gives the
/// signed distance to the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaneEquation {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl PlaneEquation {
    /// Builds the equation of the plane through `point` with unit `normal`.
    #[must_use]
    pub fn from_normal_and_point(normal: &UnitVector3, point: &Point3) -> Self {
        Self {
            a: normal.x,
            b: normal.y,
            c: normal.z,
            d: -normal.dot(&point.coords),
        }
    }

    /// Evaluates `a*x + b*y + c*z + d` at `point`.
    #[must_use]
    pub fn evaluate(&self, point: &Point3) -> f64 {
        self.a * point.x + self.b * point.y + self.c * point.z + self.d
    }
}

impl fmt::Display for PlaneEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.4}x + {:.4}y + {:.4}z + {:.4} = 0",
            self.a, self.b, self.c, self.d
        )
    }
}

/// A best-fit plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaneFit {
    /// Unit plane normal. Its sign depends on the axis method.
    pub normal: UnitVector3,
    /// Centroid of the input points, which lies on the plane.
    pub point: Point3,
    /// Implicit form, consistent with `normal` and `point`.
    pub equation: PlaneEquation,
    /// RMS of the signed perpendicular distances.
    pub residual: f64,
    /// Number of points the plane was fitted to.
    pub point_count: usize,
}

impl PlaneFit {
    /// Signed perpendicular distance from `point` to the plane.
    ///
    /// Positive on the side the normal points to.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        self.normal.dot(&(point - self.point))
    }

    /// Orthogonal projection of `point` onto the plane.
    #[must_use]
    pub fn project(&self, point: &Point3) -> Point3 {
        point - self.normal.into_inner() * self.signed_distance(point)
    }
}

impl fmt::Display for PlaneFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Normal: ({:.4}, {:.4}, {:.4}), Equation: {}, Residual: {:.4} mm",
            self.normal.x, self.normal.y, self.normal.z, self.equation, self.residual
        )
    }
}

/// Best-fit plane through three or more points.
///
/// Centres the points on their centroid and takes the normal from the
/// covariance matrix, using the configured [`AxisMethod`](crate::AxisMethod).
pub struct FitPlane<'a> {
    points: &'a [Point3],
    config: FitConfig,
}

impl<'a> FitPlane<'a> {
    /// Minimum number of points accepted.
    pub const MIN_POINTS: usize = 3;

    /// Creates a new `FitPlane` operation.
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
    /// and [`FitError::CollinearPoints`] if the points do not determine a
    /// normal.
    pub fn execute(&self) -> Result<PlaneFit> {
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

        let Some(normal) = plane_normal(&cov, self.config.axis_method, self.config.tolerance)
        else {
            warn!(
                points = n,
                method = ?self.config.axis_method,
                "plane fit rejected: points do not span a plane"
            );
            return Err(FitError::CollinearPoints.into());
        };

        let equation = PlaneEquation::from_normal_and_point(&normal, &centroid);
        let residual = rms(self.points.iter().map(|p| equation.evaluate(p)));

        debug!(
            points = n,
            nx = normal.x,
            ny = normal.y,
            nz = normal.z,
            residual,
            "fitted plane"
        );

        Ok(PlaneFit {
            normal,
            point: centroid,
            equation,
            residual,
            point_count: n,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::AxisMethod;
    use crate::error::ProbefitError;
    use crate::math::Vector3;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn fit_error(result: Result<PlaneFit>) -> FitError {
        match result.unwrap_err() {
            ProbefitError::Fit(e) => e,
            other => panic!("unexpected error: {other}"),
        }
    }

    fn horizontal_square() -> [Point3; 4] {
        [
            p(0.0, 0.0, 5.0),
            p(10.0, 0.0, 5.0),
            p(0.0, 10.0, 5.0),
            p(10.0, 10.0, 5.0),
        ]
    }

    #[test]
    fn horizontal_square_at_z5() {
        let fit = FitPlane::new(&horizontal_square()).execute().unwrap();
        assert_relative_eq!(fit.normal.z.abs(), 1.0, epsilon = 1e-12);
        // d has the opposite sign of the normal's z.
        assert_relative_eq!(fit.equation.d, -5.0 * fit.normal.z, epsilon = 1e-12);
        assert_relative_eq!(fit.point, p(5.0, 5.0, 5.0), epsilon = 1e-12);
        assert!(fit.residual < 1e-12);
        assert_eq!(fit.point_count, 4);
    }

    #[test]
    fn equation_matches_normal_and_centroid() {
        let pts = [
            p(1.0, 2.0, 3.0),
            p(4.0, 2.5, 3.2),
            p(2.0, 7.0, 2.9),
            p(6.0, 6.0, 3.1),
            p(3.0, 4.0, 3.0),
        ];
        let fit = FitPlane::new(&pts).execute().unwrap();
        assert_relative_eq!(fit.normal.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(fit.equation.a, fit.normal.x);
        assert_relative_eq!(fit.equation.b, fit.normal.y);
        assert_relative_eq!(fit.equation.c, fit.normal.z);
        assert_relative_eq!(
            fit.equation.d,
            -fit.normal.dot(&fit.point.coords),
            epsilon = 1e-12
        );
        assert!(fit.equation.evaluate(&fit.point).abs() < 1e-12);
    }

    #[test]
    fn heuristic_normal_follows_dominant_minor() {
        // Non-zero xy cross term: the dominant-minor candidate
        // (xy, xz, -(xx + yy)) is tilted away from the true normal.
        let pts = [p(0.0, 0.0, 5.0), p(10.0, 0.0, 5.0), p(0.0, 10.0, 5.0)];
        let fit = FitPlane::new(&pts).execute().unwrap();
        let expected = Vector3::new(-1.0, 0.0, -4.0).normalize();
        assert_relative_eq!(fit.normal.into_inner(), expected, epsilon = 1e-12);
        assert!(fit.residual > 0.1);
    }

    #[test]
    fn eigen_recovers_tilted_plane() {
        // Plane x + 2y - 2z = 4, normal (1, 2, -2) / 3.
        let pts: Vec<Point3> = [(0.0, 0.0), (3.0, 1.0), (-2.0, 5.0), (4.0, -3.0), (1.0, 1.0)]
            .iter()
            .map(|&(x, y)| p(x, y, (x + 2.0 * y - 4.0) / 2.0))
            .collect();
        let fit = FitPlane::new(&pts)
            .with_config(FitConfig::precise())
            .execute()
            .unwrap();
        let expected = Vector3::new(1.0, 2.0, -2.0) / 3.0;
        assert_relative_eq!(fit.normal.dot(&expected).abs(), 1.0, epsilon = 1e-9);
        assert!(fit.residual < 1e-9);
        for q in &pts {
            assert!(fit.signed_distance(q).abs() < 1e-9);
        }
    }

    #[test]
    fn eigen_normal_is_canonical() {
        let fit = FitPlane::new(&horizontal_square())
            .with_config(FitConfig::default().with_axis_method(AxisMethod::Eigen))
            .execute()
            .unwrap();
        assert_relative_eq!(fit.normal.into_inner(), Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(fit.equation.d, -5.0, epsilon = 1e-9);
    }

    #[test]
    fn rejects_too_few_points() {
        let pts = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)];
        assert_eq!(
            fit_error(FitPlane::new(&pts).execute()),
            FitError::InsufficientPoints {
                required: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn rejects_degenerate_input() {
        let coincident = [p(1.0, 1.0, 1.0); 3];
        assert_eq!(
            fit_error(FitPlane::new(&coincident).execute()),
            FitError::CollinearPoints
        );

        let along_x = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        assert_eq!(
            fit_error(FitPlane::new(&along_x).execute()),
            FitError::CollinearPoints
        );

        let diagonal = [p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), p(2.0, 2.0, 2.0)];
        assert_eq!(
            fit_error(FitPlane::new(&diagonal).with_config(FitConfig::precise()).execute()),
            FitError::CollinearPoints
        );
    }

    #[test]
    fn accepts_micrometre_square() {
        let pts = [
            p(0.0, 0.0, 0.0),
            p(5e-6, 0.0, 0.0),
            p(0.0, 5e-6, 0.0),
            p(5e-6, 5e-6, 0.0),
        ];
        for method in [AxisMethod::Heuristic, AxisMethod::Eigen] {
            let fit = FitPlane::new(&pts)
                .with_config(FitConfig::default().with_axis_method(method))
                .execute()
                .unwrap();
            assert_relative_eq!(fit.normal.z.abs(), 1.0, epsilon = 1e-9);
            assert!(fit.residual < 1e-15, "residual={}", fit.residual);
        }
    }

    #[test]
    fn signed_distance_and_projection() {
        let fit = FitPlane::new(&horizontal_square())
            .with_config(FitConfig::precise())
            .execute()
            .unwrap();
        let q = p(3.0, -2.0, 8.0);
        assert_relative_eq!(fit.signed_distance(&q), 3.0, epsilon = 1e-9);
        assert_relative_eq!(fit.equation.evaluate(&q), 3.0, epsilon = 1e-9);
        assert_relative_eq!(fit.project(&q), p(3.0, -2.0, 5.0), epsilon = 1e-9);
    }

    #[test]
    fn display_uses_fixed_point() {
        let fit = FitPlane::new(&horizontal_square()).execute().unwrap();
        assert_eq!(
            fit.to_string(),
            "Normal: (0.0000, 0.0000, -1.0000), \
             Equation: 0.0000x + 0.0000y + -1.0000z + 5.0000 = 0, \
             Residual: 0.0000 mm"
        );
    }
}
