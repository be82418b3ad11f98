//! Sample diagnostics for checking generated fields against their target
//! covariance.

use nalgebra::DMatrix;

/// Unbiased sample covariance of an N×n matrix whose columns are realisations.
/// Returns an N×N zero matrix when fewer than two columns are given.
pub fn empirical_covariance(samples: &DMatrix<f64>) -> DMatrix<f64> {
    let (n, n_samples) = samples.shape();
    if n_samples < 2 {
        return DMatrix::zeros(n, n);
    }
    let mean = samples.column_mean();
    let mut centered = samples.clone();
    for mut col in centered.column_iter_mut() {
        col -= &mean;
    }
    &centered * centered.transpose() / (n_samples - 1) as f64
}

/// ‖a − b‖_F / ‖b‖_F
pub fn relative_frobenius_error(estimate: &DMatrix<f64>, target: &DMatrix<f64>) -> f64 {
    (estimate - target).norm() / target.norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn covariance_of_known_columns() {
        // Two variables, three realisations.
        let s = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 2.0, 4.0, 6.0]);
        let c = empirical_covariance(&s);
        assert_relative_eq!(c[(0, 0)], 1.0, epsilon = 1e-14);
        assert_relative_eq!(c[(1, 1)], 4.0, epsilon = 1e-14);
        assert_relative_eq!(c[(0, 1)], 2.0, epsilon = 1e-14);
        assert_relative_eq!(c[(0, 1)], c[(1, 0)], epsilon = 1e-14);
    }

    #[test]
    fn single_column_gives_zeros() {
        let s = DMatrix::from_element(3, 1, 2.0);
        assert_eq!(empirical_covariance(&s), DMatrix::zeros(3, 3));
    }

    #[test]
    fn relative_error_is_zero_for_identical() {
        let a = DMatrix::<f64>::identity(3, 3);
        assert_eq!(relative_frobenius_error(&a, &a), 0.0);
        assert_relative_eq!(relative_frobenius_error(&(a.clone() * 2.0), &a), 1.0, epsilon = 1e-15);
    }
}
