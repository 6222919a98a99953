//! Linear algebra helpers for the quadratic programs.
use log::debug;
use nalgebra::DMatrix;

/// Whether the matrix is positive definite, tested with a Cholesky factorization.
pub fn is_pd(a: &DMatrix<f64>) -> bool {
    a.clone().cholesky().is_some()
}

fn symmetrize(a: &DMatrix<f64>) -> DMatrix<f64> {
    (a + a.transpose()) * 0.5
}

/// Nearest symmetric positive definite matrix (Higham, 1988).
///
/// The symmetric part is averaged with its polar factor; while the result still fails the
/// Cholesky test a growing multiple of the identity is added.
pub fn nearest_pd(a: &DMatrix<f64>) -> DMatrix<f64> {
    let b = symmetrize(a);
    let svd = b.clone().svd(false, true);
    let a3 = match svd.v_t {
        Some(v_t) => {
            let h = v_t.transpose() * DMatrix::from_diagonal(&svd.singular_values) * &v_t;
            symmetrize(&((&b + h) * 0.5))
        }
        None => b,
    };
    if is_pd(&a3) {
        return a3;
    }

    let n = a3.nrows();
    let spacing = (f64::EPSILON * a.norm()).max(1e-12);
    let identity = DMatrix::<f64>::identity(n, n);
    let mut a3 = a3;
    let mut k = 1.0;
    while !is_pd(&a3) && k < 100.0 {
        let min_eig = a3
            .clone()
            .symmetric_eigen()
            .eigenvalues
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        a3 += &identity * ((-min_eig).max(0.0) * k * k + spacing * k * k);
        k += 1.0;
    }
    debug!("Projected matrix to positive definite after {} corrections", k - 1.0);
    a3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pd() {
        assert!(is_pd(&DMatrix::<f64>::identity(3, 3)));
        let indefinite = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        assert!(!is_pd(&indefinite));
    }

    #[test]
    fn test_nearest_pd_of_indefinite() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        let p = nearest_pd(&a);
        assert!(is_pd(&p));
        assert!((p[(0, 1)] - p[(1, 0)]).abs() < 1e-12);
        // The projection keeps the dominant eigen direction [1, 1].
        assert!(p[(0, 1)] > 0.0);
    }

    #[test]
    fn test_nearest_pd_of_singular() {
        // rank one, as produced by V'V with duplicate columns
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        assert!(!is_pd(&a));
        assert!(is_pd(&nearest_pd(&a)));
    }

    #[test]
    fn test_nearest_pd_keeps_pd_input() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]);
        let p = nearest_pd(&a);
        assert!((p - a).norm() < 1e-10);
    }
}
