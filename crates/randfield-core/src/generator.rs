//! Pipeline orchestrator: mesh → correlation matrix → decomposition → samples.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::covariance::KernelConfig;
use crate::distribution::DistributionConfig;
use crate::error::{check_positive, FieldError, Result};
use crate::mesh::{build_mesh, build_mesh_3d, Coordinates};
use crate::random_field::{MatrixDecomposition, Truncation};

// ── Public structs ────────────────────────────────────────────────────────────

/// Regular grid the field is sampled on. `n_z = None` gives a 2D mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshParams {
    /// Node spacing in metres.
    pub spacing: f64,
    pub n_x: usize,
    pub n_y: usize,
    #[serde(default)]
    pub n_z: Option<usize>,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self { spacing: 0.005, n_x: 20, n_y: 10, n_z: None }
    }
}

impl MeshParams {
    pub fn build(&self) -> Result<Coordinates> {
        check_positive("spacing", self.spacing)?;
        let n = self.n_x * self.n_y * self.n_z.unwrap_or(1);
        if n == 0 {
            return Err(FieldError::invalid("n_nodes", 0.0, "mesh must contain at least one node"));
        }
        Ok(match self.n_z {
            None => build_mesh(self.spacing, self.n_x, self.n_y),
            Some(n_z) => build_mesh_3d(self.spacing, self.n_x, self.n_y, n_z),
        })
    }
}

/// Everything needed to reproduce a batch of field realisations.
/// Missing JSON fields fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldParams {
    pub seed: u64,
    pub mesh: MeshParams,
    pub kernel: KernelConfig,
    pub distribution: DistributionConfig,
    pub n_samples: usize,
    pub truncation: Truncation,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            seed: 42,
            mesh: MeshParams::default(),
            kernel: KernelConfig::default(),
            distribution: DistributionConfig::default(),
            n_samples: 1,
            truncation: Truncation::Full,
        }
    }
}

/// Output of one pipeline run.
#[derive(Debug, Clone)]
pub struct FieldResult {
    pub coordinates: Coordinates,
    pub correlation: DMatrix<f64>,
    /// Descending.
    pub eigenvalues: DVector<f64>,
    /// N×n_samples; column j is realisation j, row i is node i.
    pub samples: DMatrix<f64>,
    pub n_terms: usize,
    pub explained_variance: f64,
    pub clamped_eigenvalues: usize,
}

impl FieldResult {
    /// Realisations as plain vectors, node order matching `coordinates`.
    pub fn realisations(&self) -> Vec<Vec<f64>> {
        self.samples
            .column_iter()
            .map(|c| c.iter().copied().collect())
            .collect()
    }
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

pub struct FieldGenerator;

impl FieldGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Build the mesh and a ready-to-draw sampler without drawing anything.
    pub fn build_sampler(
        &self,
        params: &FieldParams,
    ) -> Result<(Coordinates, DMatrix<f64>, MatrixDecomposition)> {
        let coordinates = params.mesh.build()?;
        let kernel = params.kernel.build()?;
        let distribution = params.distribution.build()?;

        let correlation = kernel.build_correlation_matrix(&coordinates);
        let sampler = MatrixDecomposition::seeded(correlation.clone(), distribution, params.seed)?
            .truncate(params.truncation)?;
        Ok((coordinates, correlation, sampler))
    }

    /// Run the full pipeline:
    ///   1. Mesh
    ///   2. Correlation matrix (kernel over all node pairs)
    ///   3. Spectral decomposition + optional truncation
    ///   4. `n_samples` draws through the marginal transform
    pub fn generate(&self, params: &FieldParams) -> Result<FieldResult> {
        let (coordinates, correlation, mut sampler) = self.build_sampler(params)?;
        log::info!(
            "sampling {} realisation(s) of a {}-node {} field",
            params.n_samples,
            coordinates.len(),
            sampler.distribution().name(),
        );
        let samples = sampler.generate_samples(params.n_samples);

        Ok(FieldResult {
            eigenvalues: sampler.eigenvalues().clone(),
            n_terms: sampler.n_terms(),
            explained_variance: sampler.explained_variance(),
            clamped_eigenvalues: sampler.clamped_eigenvalues(),
            coordinates,
            correlation,
            samples,
        })
    }
}

impl Default for FieldGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
