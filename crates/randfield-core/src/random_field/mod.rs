//! Correlated random-field sampling by spectral decomposition of the covariance
//! matrix (Karhunen-Loève style).
//!
//! C = V Λ Vᵀ is decomposed once; every draw is L·ξ with L = V·√|Λ| and
//! ξ ~ N(0, I). Eigenpairs are kept in descending order so that the leading
//! columns of L carry the most variance and can be truncated.

pub mod stats;

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::distribution::ProbabilityDistribution;
use crate::error::{FieldError, Result};

/// Allowed |C[i,j] − C[j,i]|, relative to max(1, max|C|).
pub const SYMMETRY_TOLERANCE: f64 = 1e-10;

/// Negative eigenvalues smaller in magnitude than this (relative to
/// max(1, λ_max)) are treated as round-off and clamped silently.
pub const NEGATIVE_EIGENVALUE_TOLERANCE: f64 = 1e-10;

/// How many spectral modes the transform operator keeps.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Truncation {
    /// All N modes: L·Lᵀ reproduces C.
    #[default]
    Full,
    /// The leading `m` modes.
    Terms(usize),
    /// The fewest leading modes whose share of Σ|λ| reaches the fraction.
    Energy(f64),
}

/// Spectral sampler over a fixed covariance matrix.
///
/// Owns its random generator; seed it explicitly for reproducible streams.
#[derive(Debug, Clone)]
pub struct MatrixDecomposition<R = StdRng> {
    covariance: DMatrix<f64>,
    eigenvalues: DVector<f64>,
    eigenvectors: DMatrix<f64>,
    /// N×m, m = retained modes.
    transform: DMatrix<f64>,
    distribution: ProbabilityDistribution,
    clamped: usize,
    rng: R,
}

impl MatrixDecomposition<StdRng> {
    /// Sampler driven by a `StdRng` seeded from `seed`.
    pub fn seeded(
        covariance: DMatrix<f64>,
        distribution: ProbabilityDistribution,
        seed: u64,
    ) -> Result<Self> {
        Self::new(covariance, distribution, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> MatrixDecomposition<R> {
    /// Validate and decompose `covariance`, then build the transform operator.
    ///
    /// Fails on an empty, non-square, non-finite or asymmetric matrix.
    pub fn new(
        covariance: DMatrix<f64>,
        distribution: ProbabilityDistribution,
        rng: R,
    ) -> Result<Self> {
        validate_covariance(&covariance)?;
        let (eigenvalues, eigenvectors) = decompose(&covariance);
        let clamped = report_negative_eigenvalues(&eigenvalues);
        let transform = scaled_modes(&eigenvectors, &eigenvalues, eigenvalues.len());

        log::debug!(
            "decomposed {n}x{n} covariance: λ_max = {:.4e}, λ_min = {:.4e}",
            eigenvalues[0],
            eigenvalues[eigenvalues.len() - 1],
            n = covariance.nrows(),
        );

        Ok(Self {
            covariance,
            eigenvalues,
            eigenvectors,
            transform,
            distribution,
            clamped,
            rng,
        })
    }

    /// Keep only the leading modes selected by `truncation`.
    pub fn truncate(mut self, truncation: Truncation) -> Result<Self> {
        let m = retained_modes(&self.eigenvalues, truncation)?;
        self.transform = scaled_modes(&self.eigenvectors, &self.eigenvalues, m);
        log::debug!(
            "truncated to {m}/{} modes ({:.2}% of variance)",
            self.dim(),
            100.0 * self.explained_variance()
        );
        Ok(self)
    }

    /// Fresh N(0, I) vector, one entry per retained mode.
    fn standard_normal_draw(&mut self) -> DVector<f64> {
        let m = self.transform.ncols();
        let rng = &mut self.rng;
        DVector::from_fn(m, |_, _| rng.sample::<f64, _>(StandardNormal))
    }

    /// One realisation of the standard-normal field: L·ξ.
    pub fn generate_sample_normal(&mut self) -> DVector<f64> {
        let xi = self.standard_normal_draw();
        &self.transform * xi
    }

    /// One realisation mapped through the marginal distribution.
    pub fn generate_sample(&mut self) -> DVector<f64> {
        let z = self.generate_sample_normal();
        self.distribution.build_vector(&z)
    }

    /// `n` independent realisations, one per column (N×n).
    pub fn generate_samples(&mut self, n: usize) -> DMatrix<f64> {
        let mut out = DMatrix::zeros(self.dim(), n);
        for j in 0..n {
            let s = self.generate_sample();
            out.set_column(j, &s);
        }
        out
    }

    /// `n` independent standard-normal realisations (N×n), no marginal transform.
    pub fn generate_samples_normal(&mut self, n: usize) -> DMatrix<f64> {
        let mut out = DMatrix::zeros(self.dim(), n);
        for j in 0..n {
            let s = self.generate_sample_normal();
            out.set_column(j, &s);
        }
        out
    }

    /// Number of points N.
    pub fn dim(&self) -> usize {
        self.covariance.nrows()
    }

    /// Number of modes used per draw.
    pub fn n_terms(&self) -> usize {
        self.transform.ncols()
    }

    /// Fraction of Σ|λ| carried by the retained modes.
    pub fn explained_variance(&self) -> f64 {
        let total: f64 = self.eigenvalues.iter().map(|l| l.abs()).sum();
        if total == 0.0 {
            return 1.0;
        }
        let kept: f64 = self.eigenvalues.iter().take(self.n_terms()).map(|l| l.abs()).sum();
        kept / total
    }

    /// Eigenvalues in descending order (unclamped).
    pub fn eigenvalues(&self) -> &DVector<f64> {
        &self.eigenvalues
    }

    /// Unit eigenvectors, column k paired with `eigenvalues()[k]`.
    pub fn eigenvectors(&self) -> &DMatrix<f64> {
        &self.eigenvectors
    }

    /// The operator L.
    pub fn transform(&self) -> &DMatrix<f64> {
        &self.transform
    }

    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    pub fn distribution(&self) -> &ProbabilityDistribution {
        &self.distribution
    }

    /// Count of eigenvalues below `-NEGATIVE_EIGENVALUE_TOLERANCE · max(1, λ_max)`.
    /// Every negative eigenvalue is replaced by its absolute value; only these
    /// are counted, round-off is not.
    pub fn clamped_eigenvalues(&self) -> usize {
        self.clamped
    }
}

fn validate_covariance(c: &DMatrix<f64>) -> Result<()> {
    if c.is_empty() || !c.is_square() {
        return Err(FieldError::ShapeMismatch {
            expected: "non-empty square matrix".into(),
            got: format!("{}x{}", c.nrows(), c.ncols()),
        });
    }
    let n = c.nrows();
    for j in 0..n {
        for i in 0..n {
            if !c[(i, j)].is_finite() {
                return Err(FieldError::NonFinite { row: i, col: j });
            }
        }
    }
    let tol = SYMMETRY_TOLERANCE * c.amax().max(1.0);
    for i in 0..n {
        for j in 0..i {
            let delta = (c[(i, j)] - c[(j, i)]).abs();
            if delta > tol {
                return Err(FieldError::NotSymmetric { row: i, col: j, delta });
            }
        }
    }
    Ok(())
}

/// Symmetric eigendecomposition, pairs sorted by descending eigenvalue.
fn decompose(c: &DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
    let n = c.nrows();
    let eig = SymmetricEigen::new(c.clone());
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eig.eigenvalues[b].total_cmp(&eig.eigenvalues[a]));

    let values = DVector::from_fn(n, |k, _| eig.eigenvalues[order[k]]);
    let vectors = DMatrix::from_fn(n, n, |r, k| eig.eigenvectors[(r, order[k])]);
    (values, vectors)
}

/// Count and warn about negative eigenvalues beyond round-off.
fn report_negative_eigenvalues(eigenvalues: &DVector<f64>) -> usize {
    let scale = eigenvalues.iter().fold(1.0f64, |m, l| m.max(l.abs()));
    let tol = NEGATIVE_EIGENVALUE_TOLERANCE * scale;
    let significant: Vec<f64> = eigenvalues.iter().copied().filter(|&l| l < -tol).collect();
    if let Some(worst) = significant.iter().copied().reduce(f64::min) {
        log::warn!(
            "covariance is not positive semi-definite: {} eigenvalue(s) below -{tol:.1e} \
             (most negative {worst:.4e}); using |λ|",
            significant.len(),
        );
    }
    significant.len()
}

/// First `m` eigenvector columns, each scaled by √|λ|.
fn scaled_modes(vectors: &DMatrix<f64>, values: &DVector<f64>, m: usize) -> DMatrix<f64> {
    DMatrix::from_fn(vectors.nrows(), m, |r, k| vectors[(r, k)] * values[k].abs().sqrt())
}

fn retained_modes(eigenvalues: &DVector<f64>, truncation: Truncation) -> Result<usize> {
    let n = eigenvalues.len();
    match truncation {
        Truncation::Full => Ok(n),
        Truncation::Terms(m) if (1..=n).contains(&m) => Ok(m),
        Truncation::Terms(m) => Err(FieldError::invalid(
            "terms",
            m as f64,
            "must be between 1 and the number of points",
        )),
        Truncation::Energy(f) if f > 0.0 && f <= 1.0 => {
            let total: f64 = eigenvalues.iter().map(|l| l.abs()).sum();
            if total == 0.0 {
                return Ok(1);
            }
            let target = f * total;
            let mut acc = 0.0;
            for (k, l) in eigenvalues.iter().enumerate() {
                acc += l.abs();
                if acc >= target * (1.0 - 1e-12) {
                    return Ok(k + 1);
                }
            }
            Ok(n)
        }
        Truncation::Energy(f) => Err(FieldError::invalid("energy", f, "must lie in (0, 1]")),
    }
}
