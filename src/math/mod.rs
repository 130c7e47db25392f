pub mod distance;
pub mod moments;
pub mod principal_axis;

pub use distance::{distance, distance_2d};

/// 3D point type. Coordinates are in millimetres.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Unit-length 3D vector.
pub type UnitVector3 = nalgebra::UnitVector3<f64>;

/// 3x3 matrix type.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Global absolute tolerance for degeneracy checks.
pub const TOLERANCE: f64 = 1e-10;

/// Root-mean-square of a sequence of deviations.
///
/// Returns `0.0` for an empty sequence.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rms<I>(deviations: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum_sq, n) = deviations
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), d| (sum + d * d, n + 1));
    if n == 0 {
        return 0.0;
    }
    (sum_sq / n as f64).sqrt()
}
