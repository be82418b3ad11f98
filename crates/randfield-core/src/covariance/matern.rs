//! Matérn correlation.
//!
//! C(d) = σ² · 2^(1−ν)/Γ(ν) · α^ν · K_ν(α),  α = √(2ν)·d / lc.
//!
//! ν is a continuous smoothness parameter: ν = 1/2 is the exponential model,
//! ν → ∞ approaches the squared exponential. The general formula is 0·∞ at
//! d = 0, so the diagonal is returned as σ² directly.

use statrs::function::gamma::ln_gamma;

use crate::error::{check_non_negative, check_positive, Result};
use super::bessel::ln_bessel_k;
use super::MM_TO_M;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matern {
    lc: f64,
    sigma: f64,
    nu: f64,
    /// ln(2^(1−ν) / Γ(ν))
    ln_norm: f64,
}

impl Matern {
    /// σ = 1 and ν = 1/2.
    pub fn new(lc_mm: f64) -> Result<Self> {
        Self::with_params(lc_mm, 1.0, 0.5)
    }

    pub fn with_params(lc_mm: f64, sigma: f64, nu: f64) -> Result<Self> {
        let lc = check_positive("lc", lc_mm)? * MM_TO_M;
        let sigma = check_non_negative("sigma", sigma)?;
        let nu = check_positive("nu", nu)?;
        let ln_norm = (1.0 - nu) * std::f64::consts::LN_2 - ln_gamma(nu);
        Ok(Self { lc, sigma, nu, ln_norm })
    }

    pub fn length_scale(&self) -> f64 {
        self.lc
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn nu(&self) -> f64 {
        self.nu
    }

    #[inline]
    pub fn correlation(&self, d: f64) -> f64 {
        if d == 0.0 {
            return self.self_correlation();
        }
        let alpha = (2.0 * self.nu).sqrt() * d / self.lc;
        // Γ(ν) and K_ν(α) both overflow for large ν; combine them as logs.
        let ln_shape = self.ln_norm + self.nu * alpha.ln() + ln_bessel_k(self.nu, alpha);
        if ln_shape.is_nan() {
            // α underflowed to zero; the limit is 1.
            self.self_correlation()
        } else {
            self.sigma * self.sigma * ln_shape.exp().min(1.0)
        }
    }

    #[inline]
    pub fn self_correlation(&self) -> f64 {
        self.sigma * self.sigma
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covariance::exponential::Exponential;
    use approx::assert_relative_eq;

    #[test]
    fn half_order_reduces_to_exponential() {
        let m = Matern::with_params(50.0, 1.0, 0.5).unwrap();
        let e = Exponential::new(50.0).unwrap();
        for &d in &[1e-4, 0.01, 0.05, 0.12, 0.3] {
            assert_relative_eq!(m.correlation(d), e.correlation(d), max_relative = 1e-10);
        }
    }

    #[test]
    fn three_halves_matches_closed_form() {
        let lc = 0.04;
        let m = Matern::with_params(40.0, 1.5, 1.5).unwrap();
        for &d in &[0.005, 0.02, 0.08, 0.2] {
            let r = 3f64.sqrt() * d / lc;
            let expected = 2.25 * (1.0 + r) * (-r).exp();
            assert_relative_eq!(m.correlation(d), expected, max_relative = 1e-10);
        }
    }

    #[test]
    fn zero_distance_is_exact_variance() {
        let m = Matern::with_params(10.0, 2.0, 2.7).unwrap();
        assert_eq!(m.correlation(0.0), 4.0);
    }

    #[test]
    fn tiny_distance_approaches_variance() {
        let m = Matern::with_params(10.0, 1.0, 2.5).unwrap();
        let c = m.correlation(1e-300);
        assert!(c.is_finite());
        assert_relative_eq!(c, 1.0, max_relative = 1e-6);
    }

    #[test]
    fn non_half_integer_order_is_monotone_decreasing() {
        let m = Matern::with_params(50.0, 1.0, 1.3).unwrap();
        let mut prev = m.correlation(0.0);
        for i in 1..40 {
            let c = m.correlation(i as f64 * 0.01);
            assert!(c < prev && c > 0.0, "d={} c={c} prev={prev}", i as f64 * 0.01);
            prev = c;
        }
    }

    #[test]
    fn large_order_approaches_squared_exponential() {
        // Γ(200) overflows f64; the kernel must still be evaluated.
        let m = Matern::with_params(50.0, 1.0, 200.0).unwrap();
        let lc = 0.05;
        for &d in &[0.001, 0.01, 0.03, 0.05] {
            let c = m.correlation(d);
            let limit = (-0.5 * (d / lc) * (d / lc)).exp();
            assert!(c.is_finite() && c < 1.0, "d={d} c={c}");
            assert_relative_eq!(c, limit, max_relative = 1e-2);
        }
    }

    #[test]
    fn non_positive_nu_is_rejected() {
        assert!(Matern::with_params(50.0, 1.0, 0.0).is_err());
        assert!(Matern::with_params(50.0, 1.0, -0.5).is_err());
    }
}
