//! Marginal transforms from a standard-normal field value to a target
//! distribution (single-factor Gaussian copula).

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{check_finite, check_non_negative, check_positive, FieldError, Result};

/// y = μ + x·σ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian {
    mu: f64,
    sigma: f64,
}

impl Gaussian {
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        Ok(Self {
            mu: check_finite("mu", mu)?,
            sigma: check_non_negative("sigma", sigma)?,
        })
    }

    pub fn standard() -> Self {
        Self { mu: 0.0, sigma: 1.0 }
    }

    #[inline]
    pub fn build(&self, x: f64) -> f64 {
        self.mu + x * self.sigma
    }
}

/// Log-normal parameterised by the mean `m` and variance `v` of Y itself.
///
/// Log-space moments: μ = ln(m² / √(v + m²)), σ = √(ln(v/m² + 1)).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogNormal {
    mu: f64,
    sigma: f64,
}

impl LogNormal {
    pub fn new(mean: f64, variance: f64) -> Result<Self> {
        let m = check_positive("mean", mean)?;
        let v = check_non_negative("variance", variance)?;
        let m2 = m * m;
        Ok(Self {
            mu: (m2 / (v + m2).sqrt()).ln(),
            sigma: (v / m2 + 1.0).ln().sqrt(),
        })
    }

    /// Mean of ln(Y).
    pub fn log_mean(&self) -> f64 {
        self.mu
    }

    /// Standard deviation of ln(Y).
    pub fn log_std(&self) -> f64 {
        self.sigma
    }

    #[inline]
    pub fn build(&self, x: f64) -> f64 {
        (self.mu + x * self.sigma).exp()
    }
}

/// Weibull marginal via the copula: push through the N(μ, σ) CDF, pull back
/// through the Weibull quantile with the given shape, scale μ and location 0.
/// Shape 1 is the exponential distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weibull {
    mu: f64,
    sigma: f64,
    shape: f64,
    normal: Normal,
}

impl Weibull {
    pub fn new(mu: f64, sigma: f64, shape: f64) -> Result<Self> {
        let mu = check_positive("mu", mu)?;
        let sigma = check_positive("sigma", sigma)?;
        let shape = check_positive("shape", shape)?;
        let normal = Normal::new(mu, sigma)
            .map_err(|_| FieldError::invalid("sigma", sigma, "rejected by normal distribution"))?;
        Ok(Self { mu, sigma, shape, normal })
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    /// Weibull quantile at upper-tail probability `q = 1 − u`.
    #[inline]
    fn quantile_upper(&self, q: f64) -> f64 {
        self.mu * (-q.ln()).powf(1.0 / self.shape)
    }

    #[inline]
    pub fn build(&self, x: f64) -> f64 {
        // The survival function keeps precision where u → 1.
        let q = self.normal.sf(self.mu + x * self.sigma);
        self.quantile_upper(q)
    }
}

/// The closed set of marginal transforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbabilityDistribution {
    Gaussian(Gaussian),
    LogNormal(LogNormal),
    Weibull(Weibull),
}

impl ProbabilityDistribution {
    /// Map one standard-normal value to the target marginal.
    #[inline]
    pub fn build(&self, x: f64) -> f64 {
        match self {
            ProbabilityDistribution::Gaussian(d) => d.build(x),
            ProbabilityDistribution::LogNormal(d) => d.build(x),
            ProbabilityDistribution::Weibull(d) => d.build(x),
        }
    }

    pub fn build_vector(&self, x: &DVector<f64>) -> DVector<f64> {
        x.map(|v| self.build(v))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProbabilityDistribution::Gaussian(_) => "gaussian",
            ProbabilityDistribution::LogNormal(_) => "log_normal",
            ProbabilityDistribution::Weibull(_) => "weibull",
        }
    }
}

impl Default for ProbabilityDistribution {
    fn default() -> Self {
        ProbabilityDistribution::Gaussian(Gaussian::standard())
    }
}

impl From<Gaussian> for ProbabilityDistribution {
    fn from(d: Gaussian) -> Self {
        ProbabilityDistribution::Gaussian(d)
    }
}

impl From<LogNormal> for ProbabilityDistribution {
    fn from(d: LogNormal) -> Self {
        ProbabilityDistribution::LogNormal(d)
    }
}

impl From<Weibull> for ProbabilityDistribution {
    fn from(d: Weibull) -> Self {
        ProbabilityDistribution::Weibull(d)
    }
}

/// Serialisable marginal choice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "distribution", rename_all = "snake_case")]
pub enum DistributionConfig {
    Gaussian { mu: f64, sigma: f64 },
    LogNormal { mean: f64, variance: f64 },
    Weibull { mu: f64, sigma: f64, shape: f64 },
}

impl Default for DistributionConfig {
    fn default() -> Self {
        DistributionConfig::Gaussian { mu: 0.0, sigma: 1.0 }
    }
}

impl DistributionConfig {
    pub fn build(&self) -> Result<ProbabilityDistribution> {
        Ok(match *self {
            DistributionConfig::Gaussian { mu, sigma } => Gaussian::new(mu, sigma)?.into(),
            DistributionConfig::LogNormal { mean, variance } => {
                LogNormal::new(mean, variance)?.into()
            }
            DistributionConfig::Weibull { mu, sigma, shape } => {
                Weibull::new(mu, sigma, shape)?.into()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gaussian_is_affine() {
        let d = Gaussian::new(10.0, 2.0).unwrap();
        assert_eq!(d.build(0.0), 10.0);
        assert_eq!(d.build(-1.5), 7.0);
    }

    #[test]
    fn log_normal_moment_inversion() {
        let d = LogNormal::new(1.0, 0.25).unwrap();
        assert_relative_eq!(d.log_mean(), (1.0 / 1.25f64.sqrt()).ln(), epsilon = 1e-15);
        assert_relative_eq!(d.log_std(), 1.25f64.ln().sqrt(), epsilon = 1e-15);
        assert_eq!(d.build(0.0), d.log_mean().exp());
    }

    #[test]
    fn log_normal_recovers_target_moments() {
        // E[Y] = exp(μ + σ²/2), Var[Y] = (exp(σ²) − 1)·exp(2μ + σ²)
        let d = LogNormal::new(30.0, 16.0).unwrap();
        let (mu, s2) = (d.log_mean(), d.log_std().powi(2));
        assert_relative_eq!((mu + s2 / 2.0).exp(), 30.0, max_relative = 1e-12);
        assert_relative_eq!((s2.exp() - 1.0) * (2.0 * mu + s2).exp(), 16.0, max_relative = 1e-12);
    }

    #[test]
    fn weibull_shape_one_is_exponential_quantile() {
        let mu = 4.0;
        let d = Weibull::new(mu, 0.7, 1.0).unwrap();
        let std_normal = Normal::new(0.0, 1.0).unwrap();
        for &x in &[-2.0, -0.5, 0.0, 0.3, 1.7] {
            let u = std_normal.cdf(x);
            let expected = -mu * (1.0 - u).ln();
            assert_relative_eq!(d.build(x), expected, max_relative = 1e-9);
        }
    }

    #[test]
    fn weibull_median_and_monotonicity() {
        let d = Weibull::new(2.0, 0.5, 3.0).unwrap();
        assert_relative_eq!(d.build(0.0), 2.0 * 2f64.ln().powf(1.0 / 3.0), max_relative = 1e-12);
        let ys: Vec<f64> = (-30..=30).map(|i| d.build(i as f64 * 0.2)).collect();
        assert!(ys.windows(2).all(|w| w[0] < w[1]));
        assert!(ys.iter().all(|&y| y > 0.0 && y.is_finite()));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(Weibull::new(1.0, 1.0, 0.0).is_err());
        assert!(Weibull::new(1.0, 0.0, 2.0).is_err());
        assert!(LogNormal::new(0.0, 1.0).is_err());
        assert!(LogNormal::new(1.0, -1.0).is_err());
        assert!(Gaussian::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn build_vector_is_elementwise() {
        let d: ProbabilityDistribution = Gaussian::new(1.0, 3.0).unwrap().into();
        let y = d.build_vector(&DVector::from_vec(vec![0.0, 1.0, -1.0]));
        assert_eq!(y.as_slice(), &[1.0, 4.0, -2.0]);
    }

    #[test]
    fn config_round_trip_through_json() {
        let cfg: DistributionConfig =
            serde_json::from_str(r#"{"distribution":"weibull","mu":3,"sigma":0.5,"shape":5}"#)
                .unwrap();
        let d = cfg.build().unwrap();
        assert_eq!(d.name(), "weibull");
        let cfg: DistributionConfig =
            serde_json::from_str(r#"{"distribution":"log_normal","mean":1,"variance":0.25}"#)
                .unwrap();
        assert_eq!(cfg.build().unwrap().name(), "log_normal");
    }
}
