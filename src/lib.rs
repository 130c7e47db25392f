//! Best-fit geometry for probe-captured 3D points.
//!
//! Every operation is a small value built from a borrowed point slice and
//! consumed by `execute()`. Nothing is cached between calls, so fits on
//! separate inputs can run on separate threads.
//!
//! ```
//! use probefit::fit::CircleFrom3Points;
//! use probefit::math::Point3;
//!
//! let points = [
//!     Point3::new(10.0, 0.0, 0.0),
//!     Point3::new(0.0, 10.0, 0.0),
//!     Point3::new(-10.0, 0.0, 0.0),
//! ];
//! let circle = CircleFrom3Points::new(&points).execute()?;
//! assert!((circle.radius - 10.0).abs() < 1e-12);
//! # Ok::<(), probefit::ProbefitError>(())
//! ```

pub mod config;
pub mod error;
pub mod fit;
pub mod math;

pub use config::{AxisMethod, FitConfig};
pub use error::{ConfigError, FitError, ProbefitError, Result};
pub use fit::{fit, FitKind, Fitted};
