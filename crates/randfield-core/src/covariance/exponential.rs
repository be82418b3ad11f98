//! Exponential correlation: C(d) = σ·exp(−d / lc).
//! Not differentiable at d = 0, so realisations are rough.

use crate::error::{check_non_negative, check_positive, Result};
use super::MM_TO_M;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exponential {
    lc: f64,
    sigma: f64,
}

impl Exponential {
    /// Unit marginal (σ = 1) with correlation length `lc_mm` in millimetres.
    pub fn new(lc_mm: f64) -> Result<Self> {
        Self::with_sigma(lc_mm, 1.0)
    }

    pub fn with_sigma(lc_mm: f64, sigma: f64) -> Result<Self> {
        Ok(Self {
            lc: check_positive("lc", lc_mm)? * MM_TO_M,
            sigma: check_non_negative("sigma", sigma)?,
        })
    }

    pub fn length_scale(&self) -> f64 {
        self.lc
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    #[inline]
    pub fn correlation(&self, d: f64) -> f64 {
        if d == 0.0 {
            return self.self_correlation();
        }
        self.sigma * (-d / self.lc).exp()
    }

    /// σ, not σ²: the variance scale enters linearly in this model.
    #[inline]
    pub fn self_correlation(&self) -> f64 {
        self.sigma
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn one_correlation_length_gives_e_inverse() {
        let k = Exponential::with_sigma(50.0, 2.0).unwrap();
        assert_eq!(k.correlation(0.0), 2.0);
        assert_relative_eq!(k.correlation(0.05), 2.0 * (-1.0f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn length_scale_is_converted_from_millimetres() {
        let k = Exponential::new(50.0).unwrap();
        assert_relative_eq!(k.length_scale(), 0.05, epsilon = 1e-15);
    }
}
