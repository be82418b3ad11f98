//! Isotropic, stationary correlation kernels and correlation-matrix assembly.
//!
//! Correlation lengths are supplied in millimetres and stored in metres;
//! coordinates are always in metres.

pub mod bessel;
pub mod exponential;
pub mod gaussian;
pub mod jcss;
pub mod matern;
pub mod params;

use nalgebra::DMatrix;
#[cfg(feature = "threading")]
use rayon::prelude::*;

use crate::error::{FieldError, Result};
use crate::mesh::Coordinates;

pub use exponential::Exponential;
pub use gaussian::Gaussian;
pub use jcss::Jcss;
pub use matern::Matern;
pub use params::KernelConfig;

/// Millimetres → metres.
pub const MM_TO_M: f64 = 1e-3;

/// The closed set of supported correlation models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CovarianceFunction {
    Jcss(Jcss),
    Exponential(Exponential),
    Gaussian(Gaussian),
    Matern(Matern),
}

impl CovarianceFunction {
    /// Kernel value at Euclidean distance `d` (metres).
    #[inline]
    pub fn correlation(&self, d: f64) -> f64 {
        match self {
            CovarianceFunction::Jcss(k) => k.correlation(d),
            CovarianceFunction::Exponential(k) => k.correlation(d),
            CovarianceFunction::Gaussian(k) => k.correlation(d),
            CovarianceFunction::Matern(k) => k.correlation(d),
        }
    }

    /// Value on the diagonal of every matrix this kernel builds.
    pub fn self_correlation(&self) -> f64 {
        match self {
            CovarianceFunction::Jcss(k) => k.self_correlation(),
            CovarianceFunction::Exponential(k) => k.self_correlation(),
            CovarianceFunction::Gaussian(k) => k.self_correlation(),
            CovarianceFunction::Matern(k) => k.self_correlation(),
        }
    }

    /// Correlation length in metres.
    pub fn length_scale(&self) -> f64 {
        match self {
            CovarianceFunction::Jcss(k) => k.length_scale(),
            CovarianceFunction::Exponential(k) => k.length_scale(),
            CovarianceFunction::Gaussian(k) => k.length_scale(),
            CovarianceFunction::Matern(k) => k.length_scale(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CovarianceFunction::Jcss(_) => "jcss",
            CovarianceFunction::Exponential(_) => "exponential",
            CovarianceFunction::Gaussian(_) => "gaussian",
            CovarianceFunction::Matern(_) => "matern",
        }
    }

    /// Dense N×N correlation matrix over `points`.
    ///
    /// Only the lower triangle (diagonal included) is evaluated; the upper
    /// triangle is a mirror, so the result is exactly symmetric.
    pub fn build_correlation_matrix(&self, points: &Coordinates) -> DMatrix<f64> {
        let n = points.len();
        let rows = self.lower_triangle(points);
        let mut c = DMatrix::zeros(n, n);
        for (i, row) in rows.into_iter().enumerate() {
            for (j, v) in row.into_iter().enumerate() {
                c[(i, j)] = v;
                c[(j, i)] = v;
            }
        }
        log::debug!("{} correlation matrix: {n}x{n}", self.name());
        c
    }

    /// Row `i` holds the kernel values for columns `0..=i`.
    #[cfg(not(feature = "threading"))]
    fn lower_triangle(&self, points: &Coordinates) -> Vec<Vec<f64>> {
        (0..points.len())
            .map(|i| self.triangle_row(points, i))
            .collect()
    }

    #[cfg(feature = "threading")]
    fn lower_triangle(&self, points: &Coordinates) -> Vec<Vec<f64>> {
        (0..points.len())
            .into_par_iter()
            .map(|i| self.triangle_row(points, i))
            .collect()
    }

    #[inline]
    fn triangle_row(&self, points: &Coordinates, i: usize) -> Vec<f64> {
        (0..=i)
            .map(|j| self.correlation(points.distance(i, j)))
            .collect()
    }

    /// Apply the kernel elementwise to a precomputed square distance matrix.
    pub fn correlation_from_distances(&self, d: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if !d.is_square() {
            return Err(FieldError::ShapeMismatch {
                expected: "square distance matrix".into(),
                got: format!("{}x{}", d.nrows(), d.ncols()),
            });
        }
        Ok(d.map(|v| self.correlation(v)))
    }
}

impl From<Jcss> for CovarianceFunction {
    fn from(k: Jcss) -> Self {
        CovarianceFunction::Jcss(k)
    }
}

impl From<Exponential> for CovarianceFunction {
    fn from(k: Exponential) -> Self {
        CovarianceFunction::Exponential(k)
    }
}

impl From<Gaussian> for CovarianceFunction {
    fn from(k: Gaussian) -> Self {
        CovarianceFunction::Gaussian(k)
    }
}

impl From<Matern> for CovarianceFunction {
    fn from(k: Matern) -> Self {
        CovarianceFunction::Matern(k)
    }
}
