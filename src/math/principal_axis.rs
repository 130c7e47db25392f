//! Principal-axis extraction from a covariance matrix.
//!
//! Plane fits need the axis of least spread (the normal), line fits the axis
//! of greatest spread (the direction). Both are available as the fast
//! heuristic selection or through a symmetric eigen-decomposition, see
//! [`AxisMethod`].

use crate::config::AxisMethod;

use super::moments::Covariance;
use super::{UnitVector3, Vector3};

/// Eigenvalue ratio below which the decomposition cannot tell an axis from
/// rounding noise.
const EIGEN_NOISE: f64 = 1e3 * f64::EPSILON;

/// Returns the plane normal for the given covariance.
///
/// Returns `None` when the points do not span a plane: the candidate normal
/// has no width above `tolerance` (heuristic), or the middle eigenvalue does
/// not (eigen).
#[must_use]
pub fn plane_normal(cov: &Covariance, method: AxisMethod, tolerance: f64) -> Option<UnitVector3> {
    match method {
        AxisMethod::Heuristic => {
            let candidate = heuristic_normal(cov);
            if is_flat(candidate.norm(), tolerance) {
                return None;
            }
            UnitVector3::try_new(candidate, 0.0)
        }
        AxisMethod::Eigen => {
            let (values, vectors) = sorted_eigen(cov);
            if is_flat(values[1], tolerance) || values[1] <= values[2] * EIGEN_NOISE {
                return None;
            }
            UnitVector3::try_new(canonical_sign(vectors[0]), 0.0)
        }
    }
}

/// Returns the line direction for the given covariance.
///
/// Returns `None` when all points coincide, i.e. no axis has a spread wider
/// than `tolerance`.
#[must_use]
pub fn line_direction(
    cov: &Covariance,
    method: AxisMethod,
    tolerance: f64,
) -> Option<UnitVector3> {
    match method {
        AxisMethod::Heuristic => {
            if is_flat(cov.xx.max(cov.yy).max(cov.zz), tolerance) {
                return None;
            }
            UnitVector3::try_new(heuristic_direction(cov), 0.0)
        }
        AxisMethod::Eigen => {
            let (values, vectors) = sorted_eigen(cov);
            if is_flat(values[2], tolerance) {
                return None;
            }
            UnitVector3::try_new(canonical_sign(vectors[2]), 0.0)
        }
    }
}

/// Whether a sum of squared offsets is too thin to carry an axis.
///
/// The spread is compared as a length, so `tolerance` keeps its meaning at
/// any part scale. NaN counts as flat.
fn is_flat(spread: f64, tolerance: f64) -> bool {
    spread.max(0.0).sqrt() <= tolerance
}

/// Candidate normal built from the entries of the dominant 2x2 minor.
fn heuristic_normal(cov: &Covariance) -> Vector3 {
    let Covariance {
        xx,
        xy,
        xz,
        yy,
        yz,
        zz,
    } = *cov;

    let det_xy = xx * yy - xy * xy;
    let det_xz = xx * zz - xz * xz;
    let det_yz = yy * zz - yz * yz;

    if det_xy > det_xz && det_xy > det_yz {
        Vector3::new(xy, xz, -(xx + yy))
    } else if det_xz > det_yz {
        Vector3::new(xz, -(xx + zz), xy)
    } else {
        Vector3::new(-(yy + zz), yz, xy)
    }
}

/// Unnormalised direction with the dominant diagonal axis set to 1.
///
/// The caller guarantees the dominant diagonal entry is non-zero.
fn heuristic_direction(cov: &Covariance) -> Vector3 {
    let Covariance {
        xx,
        xy,
        xz,
        yy,
        yz,
        zz,
    } = *cov;

    if xx >= yy && xx >= zz {
        Vector3::new(1.0, xy / xx, xz / xx)
    } else if yy >= xx && yy >= zz {
        Vector3::new(xy / yy, 1.0, yz / yy)
    } else {
        Vector3::new(xz / zz, yz / zz, 1.0)
    }
}

/// Eigenvalues in ascending order with their eigenvectors.
fn sorted_eigen(cov: &Covariance) -> ([f64; 3], [Vector3; 3]) {
    let eigen = cov.matrix().symmetric_eigen();
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

    let values = order.map(|i| eigen.eigenvalues[i]);
    let vectors = order.map(|i| eigen.eigenvectors.column(i).into_owned());
    (values, vectors)
}

/// Flips `v` so that its largest-magnitude component is positive.
fn canonical_sign(v: Vector3) -> Vector3 {
    if v[v.iamax()] < 0.0 {
        -v
    } else {
        v
    }
}
