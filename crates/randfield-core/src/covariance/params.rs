use serde::{Deserialize, Serialize};

use super::{CovarianceFunction, Exponential, Gaussian, Jcss, Matern};
use crate::error::Result;

fn unit() -> f64 {
    1.0
}

fn half() -> f64 {
    0.5
}

/// Serialisable kernel choice. Lengths are in millimetres.
///
/// ```json
/// { "model": "matern", "lc_mm": 50.0, "sigma": 1.0, "nu": 1.5 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum KernelConfig {
    Jcss {
        lc_mm: f64,
        rho: f64,
    },
    Exponential {
        lc_mm: f64,
        #[serde(default = "unit")]
        sigma: f64,
    },
    Gaussian {
        lc_mm: f64,
        #[serde(default = "unit")]
        sigma: f64,
    },
    Matern {
        lc_mm: f64,
        #[serde(default = "unit")]
        sigma: f64,
        #[serde(default = "half")]
        nu: f64,
    },
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig::Exponential { lc_mm: 50.0, sigma: 1.0 }
    }
}

impl KernelConfig {
    /// Validate the parameters and construct the kernel.
    pub fn build(&self) -> Result<CovarianceFunction> {
        Ok(match *self {
            KernelConfig::Jcss { lc_mm, rho } => Jcss::new(lc_mm, rho)?.into(),
            KernelConfig::Exponential { lc_mm, sigma } => {
                Exponential::with_sigma(lc_mm, sigma)?.into()
            }
            KernelConfig::Gaussian { lc_mm, sigma } => Gaussian::with_sigma(lc_mm, sigma)?.into(),
            KernelConfig::Matern { lc_mm, sigma, nu } => {
                Matern::with_params(lc_mm, sigma, nu)?.into()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;

    #[test]
    fn matern_defaults_fill_in() {
        let cfg: KernelConfig = serde_json::from_str(r#"{"model":"matern","lc_mm":25}"#).unwrap();
        assert_eq!(cfg, KernelConfig::Matern { lc_mm: 25.0, sigma: 1.0, nu: 0.5 });
        let k = cfg.build().unwrap();
        assert_eq!(k.name(), "matern");
        assert!((k.length_scale() - 0.025).abs() < 1e-15);
    }

    #[test]
    fn invalid_config_fails_at_build() {
        let cfg: KernelConfig = serde_json::from_str(r#"{"model":"jcss","lc_mm":50,"rho":2}"#).unwrap();
        assert!(matches!(
            cfg.build(),
            Err(FieldError::InvalidParameter { name: "rho", .. })
        ));
    }

    #[test]
    fn unknown_model_is_a_parse_error() {
        assert!(serde_json::from_str::<KernelConfig>(r#"{"model":"cauchy","lc_mm":5}"#).is_err());
    }
}
