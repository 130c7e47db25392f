//! Fit configuration.

use crate::error::{ConfigError, Result};
use crate::math::TOLERANCE;

/// How the principal axis is extracted from a covariance matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AxisMethod {
    /// Picks the axis from the dominant 2x2 principal minor (planes) or the
    /// dominant diagonal entry (lines). Matches previously persisted results
    /// bit for bit, but can tilt the plane normal for point sets whose
    /// centred cross terms are non-zero.
    #[default]
    Heuristic,
    /// Symmetric eigen-decomposition: the eigenvector of the smallest
    /// eigenvalue for planes, of the largest for lines.
    Eigen,
}

/// Parameters shared by all fit operations.
///
/// # Example
///
/// ```
/// use probefit::{AxisMethod, FitConfig};
///
/// let cfg = FitConfig::default();
/// assert!((cfg.tolerance - 1e-10).abs() < 1e-20);
/// assert_eq!(cfg.axis_method, AxisMethod::Heuristic);
///
/// let precise = FitConfig::precise();
/// assert_eq!(precise.axis_method, AxisMethod::Eigen);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitConfig {
    /// Absolute threshold below which a determinant or distance counts as
    /// degenerate.
    pub tolerance: f64,

    /// Principal-axis extraction for plane and line fits.
    pub axis_method: AxisMethod,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self::compatible()
    }
}

impl FitConfig {
    /// Creates a configuration with the given tolerance and heuristic axes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTolerance`] if `tolerance` is negative,
    /// NaN or infinite.
    pub fn new(tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(tolerance).into());
        }
        Ok(Self {
            tolerance,
            axis_method: AxisMethod::Heuristic,
        })
    }

    /// Heuristic axes with the `1e-10` absolute tolerance.
    #[must_use]
    pub const fn compatible() -> Self {
        Self {
            tolerance: TOLERANCE,
            axis_method: AxisMethod::Heuristic,
        }
    }

    /// Eigen-decomposition axes with the `1e-10` absolute tolerance.
    #[must_use]
    pub const fn precise() -> Self {
        Self {
            tolerance: TOLERANCE,
            axis_method: AxisMethod::Eigen,
        }
    }

    /// Returns a copy using `method` for plane and line axes.
    #[must_use]
    pub fn with_axis_method(mut self, method: AxisMethod) -> Self {
        self.axis_method = method;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ProbefitError;

    #[test]
    fn default_is_compatible() {
        assert_eq!(FitConfig::default(), FitConfig::compatible());
    }

    #[test]
    fn new_accepts_zero() {
        let cfg = FitConfig::new(0.0).unwrap();
        assert!(cfg.tolerance.abs() < f64::EPSILON);
        assert_eq!(cfg.axis_method, AxisMethod::Heuristic);
    }

    #[test]
    fn new_rejects_negative_and_non_finite() {
        for bad in [-1e-6, f64::NAN, f64::INFINITY] {
            let err = FitConfig::new(bad).unwrap_err();
            assert!(matches!(
                err,
                ProbefitError::Config(ConfigError::InvalidTolerance(_))
            ));
        }
    }

    #[test]
    fn with_axis_method_keeps_tolerance() {
        let cfg = FitConfig::new(1e-6)
            .unwrap()
            .with_axis_method(AxisMethod::Eigen);
        assert!((cfg.tolerance - 1e-6).abs() < 1e-18);
        assert_eq!(cfg.axis_method, AxisMethod::Eigen);
    }
}
