//! Moment accumulators for the least-squares fits.
//!
//! Each accumulator is an immutable value built by folding over a point
//! slice. Accumulators over disjoint chunks can be combined with `merge`,
//! which gives the same sums as folding the whole slice.

use super::{Matrix3, Point3, Vector3};

/// Power sums of the x/y coordinates used by the algebraic circle fit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CircleMoments {
    /// Number of accumulated points.
    pub n: usize,
    pub sx: f64,
    pub sy: f64,
    pub sxx: f64,
    pub syy: f64,
    pub sxy: f64,
    pub sxxx: f64,
    pub syyy: f64,
    pub sxxy: f64,
    pub sxyy: f64,
    /// Sum of z, used only for the center height.
    pub sz: f64,
}

impl CircleMoments {
    /// Folds all points into a fresh accumulator.
    #[must_use]
    pub fn from_points(points: &[Point3]) -> Self {
        points.iter().fold(Self::default(), Self::accumulate)
    }

    /// Returns a new accumulator with `p` added.
    #[must_use]
    pub fn accumulate(self, p: &Point3) -> Self {
        let x2 = p.x * p.x;
        let y2 = p.y * p.y;
        Self {
            n: self.n + 1,
            sx: self.sx + p.x,
            sy: self.sy + p.y,
            sxx: self.sxx + x2,
            syy: self.syy + y2,
            sxy: self.sxy + p.x * p.y,
            sxxx: self.sxxx + x2 * p.x,
            syyy: self.syyy + y2 * p.y,
            sxxy: self.sxxy + x2 * p.y,
            sxyy: self.sxyy + p.x * y2,
            sz: self.sz + p.z,
        }
    }

    /// Combines two accumulators built over disjoint point sets.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            n: self.n + other.n,
            sx: self.sx + other.sx,
            sy: self.sy + other.sy,
            sxx: self.sxx + other.sxx,
            syy: self.syy + other.syy,
            sxy: self.sxy + other.sxy,
            sxxx: self.sxxx + other.sxxx,
            syyy: self.syyy + other.syyy,
            sxxy: self.sxxy + other.sxxy,
            sxyy: self.sxyy + other.sxyy,
            sz: self.sz + other.sz,
        }
    }

    /// Mean z of the accumulated points, `0.0` when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_z(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        self.sz / self.n as f64
    }

    /// Builds the 2x2 normal-equation system for the circle center.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn normal_equations(&self) -> CircleNormalEquations {
        let n = self.n as f64;
        let r2 = self.sxx + self.syy;
        CircleNormalEquations {
            a: n * self.sxx - self.sx * self.sx,
            b: n * self.sxy - self.sx * self.sy,
            c: n * self.syy - self.sy * self.sy,
            d: 0.5 * (n * (self.sxxx + self.sxyy) - self.sx * r2),
            e: 0.5 * (n * (self.sxxy + self.syyy) - self.sy * r2),
        }
    }
}

/// The symmetric system `[a b; b c] * center = [d; e]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleNormalEquations {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
}

impl CircleNormalEquations {
    /// Determinant `a*c - b^2` of the system matrix.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.a * self.c - self.b * self.b
    }

    /// Solves for the center with Cramer's rule.
    ///
    /// Returns `None` when `|determinant| < tolerance`.
    #[must_use]
    pub fn solve(&self, tolerance: f64) -> Option<(f64, f64)> {
        let denom = self.determinant();
        if denom.abs() < tolerance {
            return None;
        }
        let cx = (self.d * self.c - self.b * self.e) / denom;
        let cy = (self.a * self.e - self.b * self.d) / denom;
        Some((cx, cy))
    }
}

/// Running coordinate sum used to compute a centroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSum {
    pub n: usize,
    pub sum: Vector3,
}

impl Default for PointSum {
    fn default() -> Self {
        Self {
            n: 0,
            sum: Vector3::zeros(),
        }
    }
}

impl PointSum {
    #[must_use]
    pub fn from_points(points: &[Point3]) -> Self {
        points.iter().fold(Self::default(), Self::accumulate)
    }

    #[must_use]
    pub fn accumulate(self, p: &Point3) -> Self {
        Self {
            n: self.n + 1,
            sum: self.sum + p.coords,
        }
    }

    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            n: self.n + other.n,
            sum: self.sum + other.sum,
        }
    }

    /// Arithmetic mean of the accumulated points, `None` when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> Option<Point3> {
        if self.n == 0 {
            return None;
        }
        Some(Point3::from(self.sum / self.n as f64))
    }
}

/// Unnormalised second moments of points about a fixed center.
///
/// Entries are sums over `(p - center)` products, not divided by `n`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Covariance {
    pub xx: f64,
    pub xy: f64,
    pub xz: f64,
    pub yy: f64,
    pub yz: f64,
    pub zz: f64,
}

impl Covariance {
    /// Folds all points, centred on `center`, into a fresh accumulator.
    #[must_use]
    pub fn about(points: &[Point3], center: &Point3) -> Self {
        points
            .iter()
            .fold(Self::default(), |acc, p| acc.accumulate(&(p - center)))
    }

    /// Returns a new accumulator with the centred offset `d` added.
    #[must_use]
    pub fn accumulate(self, d: &Vector3) -> Self {
        Self {
            xx: self.xx + d.x * d.x,
            xy: self.xy + d.x * d.y,
            xz: self.xz + d.x * d.z,
            yy: self.yy + d.y * d.y,
            yz: self.yz + d.y * d.z,
            zz: self.zz + d.z * d.z,
        }
    }

    /// Combines two accumulators taken about the same center.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            xx: self.xx + other.xx,
            xy: self.xy + other.xy,
            xz: self.xz + other.xz,
            yy: self.yy + other.yy,
            yz: self.yz + other.yz,
            zz: self.zz + other.zz,
        }
    }

    /// The full symmetric 3x3 matrix.
    #[must_use]
    pub fn matrix(&self) -> Matrix3 {
        Matrix3::new(
            self.xx, self.xy, self.xz, //
            self.xy, self.yy, self.yz, //
            self.xz, self.yz, self.zz,
        )
    }
}

/// Computes the centroid of `points` and the covariance about it.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn centroid_and_covariance(points: &[Point3]) -> Option<(Point3, Covariance)> {
    let centroid = PointSum::from_points(points).centroid()?;
    Some((centroid, Covariance::about(points, &centroid)))
}
