use thiserror::Error;

/// Top-level error type for the probefit engine.
#[derive(Debug, Error)]
pub enum ProbefitError {
    #[error(transparent)]
    Fit(#[from] FitError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unknown geometry kind: {0}")]
    UnknownKind(String),
}

/// Errors raised by the fitting operations.
///
/// All of these are input-validation or numeric-degeneracy failures; a fit
/// either produces a complete result or one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FitError {
    #[error("need at least {required} points, got {actual}")]
    InsufficientPoints { required: usize, actual: usize },

    #[error("need exactly {expected} points, got {actual}")]
    WrongPointCount { expected: usize, actual: usize },

    #[error("points are collinear")]
    CollinearPoints,

    #[error("points are coincident")]
    CoincidentPoints,
}

/// Errors related to fit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),
}

/// Convenience type alias for results using [`ProbefitError`].
pub type Result<T> = std::result::Result<T, ProbefitError>;

impl ProbefitError {
    /// Returns the underlying fit failure, if this is one.
    #[must_use]
    pub fn as_fit(&self) -> Option<&FitError> {
        match self {
            Self::Fit(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_counts() {
        let e = FitError::InsufficientPoints {
            required: 3,
            actual: 2,
        };
        assert_eq!(e.to_string(), "need at least 3 points, got 2");

        let e = FitError::WrongPointCount {
            expected: 2,
            actual: 4,
        };
        assert_eq!(e.to_string(), "need exactly 2 points, got 4");
    }

    #[test]
    fn top_level_is_transparent() {
        let e: ProbefitError = FitError::CollinearPoints.into();
        assert_eq!(e.to_string(), "points are collinear");
        assert_eq!(e.as_fit(), Some(&FitError::CollinearPoints));
    }

    #[test]
    fn config_error_is_not_a_fit_error() {
        let e: ProbefitError = ConfigError::InvalidTolerance(-1.0).into();
        assert!(e.as_fit().is_none());
    }
}
