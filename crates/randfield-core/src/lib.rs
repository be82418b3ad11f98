//! Spatially correlated random fields.
//!
//! A correlation kernel turns a set of coordinates into a dense covariance
//! matrix; the matrix is eigendecomposed once and every realisation is drawn as
//! L·ξ with ξ standard normal, then mapped through a marginal distribution.
//!
//! ```no_run
//! use randfield_core::covariance::{CovarianceFunction, Exponential};
//! use randfield_core::distribution::LogNormal;
//! use randfield_core::mesh::build_mesh;
//! use randfield_core::random_field::MatrixDecomposition;
//!
//! # fn main() -> randfield_core::Result<()> {
//! let points = build_mesh(0.005, 40, 20);
//! let kernel: CovarianceFunction = Exponential::new(50.0)?.into();
//! let c = kernel.build_correlation_matrix(&points);
//! let mut field = MatrixDecomposition::seeded(c, LogNormal::new(1.0, 0.25)?.into(), 42)?;
//! let realisation = field.generate_sample();
//! assert_eq!(realisation.len(), points.len());
//! # Ok(())
//! # }
//! ```

pub mod covariance;
pub mod distribution;
pub mod error;
pub mod generator;
pub mod mesh;
pub mod random_field;

pub use error::{FieldError, Result};
