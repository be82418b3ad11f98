use thiserror::Error;

/// Errors raised while building kernels, transforms or samplers.
///
/// Every variant is an input or logic error; nothing here is transient.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    #[error("matrix is not symmetric at ({row}, {col}): |C[i,j] - C[j,i]| = {delta:e}")]
    NotSymmetric { row: usize, col: usize, delta: f64 },

    #[error("non-finite matrix entry at ({row}, {col})")]
    NonFinite { row: usize, col: usize },
}

pub type Result<T> = std::result::Result<T, FieldError>;

impl FieldError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        FieldError::InvalidParameter { name, value, reason }
    }
}

pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(FieldError::invalid(name, value, "must be finite and > 0"))
    }
}

pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(FieldError::invalid(name, value, "must be finite and >= 0"))
    }
}

pub(crate) fn check_finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FieldError::invalid(name, value, "must be finite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validators_reject_nan_and_out_of_range() {
        assert!(check_positive("lc", 0.0).is_err());
        assert!(check_positive("lc", f64::NAN).is_err());
        assert_eq!(check_positive("lc", 2.5), Ok(2.5));
        assert!(check_non_negative("sigma", -1e-12).is_err());
        assert_eq!(check_non_negative("sigma", 0.0), Ok(0.0));
        assert!(check_finite("mu", f64::INFINITY).is_err());
    }

    #[test]
    fn message_names_the_parameter() {
        let e = check_positive("lc", -3.0).unwrap_err();
        let msg = e.to_string();
        assert!(msg.contains("`lc`"), "{msg}");
        assert!(msg.contains("-3"), "{msg}");
    }
}
