//! JCSS probabilistic model code correlation (Joint Committee on Structural Safety).
//!
//! C(d) = ρ + (1 − ρ)·exp(−d / lc). ρ is a correlation floor that never decays,
//! e.g. a shared bias between all points of a member.

use crate::error::{check_positive, FieldError, Result};
use super::MM_TO_M;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jcss {
    /// Correlation length in metres.
    lc: f64,
    rho: f64,
}

impl Jcss {
    /// `lc_mm` is the correlation length in millimetres, `rho` the floor in [0, 1].
    pub fn new(lc_mm: f64, rho: f64) -> Result<Self> {
        let lc = check_positive("lc", lc_mm)? * MM_TO_M;
        if !(0.0..=1.0).contains(&rho) {
            return Err(FieldError::invalid("rho", rho, "must lie in [0, 1]"));
        }
        Ok(Self { lc, rho })
    }

    pub fn length_scale(&self) -> f64 {
        self.lc
    }

    pub fn rho(&self) -> f64 {
        self.rho
    }

    #[inline]
    pub fn correlation(&self, d: f64) -> f64 {
        if d == 0.0 {
            return self.self_correlation();
        }
        self.rho + (1.0 - self.rho) * (-d / self.lc).exp()
    }

    #[inline]
    pub fn self_correlation(&self) -> f64 {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn decays_towards_rho() {
        let k = Jcss::new(50.0, 0.25).unwrap();
        assert_eq!(k.correlation(0.0), 1.0);
        assert_relative_eq!(k.correlation(0.05), 0.25 + 0.75 * (-1.0f64).exp(), epsilon = 1e-15);
        assert_relative_eq!(k.correlation(100.0), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn rho_outside_unit_interval_is_rejected() {
        assert!(Jcss::new(50.0, -0.1).is_err());
        assert!(Jcss::new(50.0, 1.1).is_err());
        assert!(Jcss::new(50.0, f64::NAN).is_err());
        assert!(Jcss::new(0.0, 0.5).is_err());
        assert!(Jcss::new(50.0, 1.0).is_ok());
    }
}
