//! Quadratic Programming
//!
//! Strictly convex quadratic programs
//!
//! ```text
//! min 0.5 x'Gx - a'x   subject to   C'x >= b
//! ```
//!
//! where the first `meq` columns of `C` are equality constraints. `InteriorPoint` solves them
//! with clarabel.
use crate::errors::QuantificationError;
use crate::solver::conic::{solve_conic, Cone, ConicSettings};
use crate::solver::linalg::is_pd;
use nalgebra::{DMatrix, DVector};

/// Quadratic programming capability.
pub trait QuadraticProgram: Send + Sync {
    /// Solve the program, returning the minimizer.
    ///
    /// * `g` - Symmetric positive definite `n x n` matrix.
    /// * `a` - Linear term, length `n`.
    /// * `c` - Constraint matrix `n x m`, one constraint per column.
    /// * `b` - Constraint bounds, length `m`.
    /// * `meq` - Number of leading equality constraints.
    fn solve(
        &self,
        g: &DMatrix<f64>,
        a: &DVector<f64>,
        c: &DMatrix<f64>,
        b: &DVector<f64>,
        meq: usize,
    ) -> Result<DVector<f64>, QuantificationError>;
}

/// Interior point solver, the program is handed to clarabel.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteriorPoint {
    pub settings: ConicSettings,
}

impl QuadraticProgram for InteriorPoint {
    fn solve(
        &self,
        g: &DMatrix<f64>,
        a: &DVector<f64>,
        c: &DMatrix<f64>,
        b: &DVector<f64>,
        meq: usize,
    ) -> Result<DVector<f64>, QuantificationError> {
        let n = g.nrows();
        if g.ncols() != n || a.len() != n || c.nrows() != n || c.ncols() != b.len() || meq > b.len() {
            return Err(QuantificationError::DataShape(format!(
                "inconsistent quadratic program: G {}x{}, a {}, C {}x{}, b {}, meq {}",
                g.nrows(),
                g.ncols(),
                a.len(),
                c.nrows(),
                c.ncols(),
                b.len(),
                meq
            )));
        }
        if !is_pd(g) {
            return Err(QuantificationError::Solver("G is not positive definite".to_string()));
        }

        // C'x >= b becomes -C'x + s = -b with s in the zero cone for equalities and the
        // non-negative cone otherwise.
        let m = c.ncols();
        let q: Vec<f64> = a.iter().map(|v| -v).collect();
        let a_con = -c.transpose();
        let b_con: Vec<f64> = b.iter().map(|v| -v).collect();
        let mut cones = Vec::with_capacity(2);
        if meq > 0 {
            cones.push(Cone::Zero(meq));
        }
        if m > meq {
            cones.push(Cone::Nonnegative(m - meq));
        }
        let x = solve_conic(g, &q, &a_con, &b_con, &cones, &self.settings)?;
        Ok(DVector::from_vec(x))
    }
}

/// Constraints of the probability simplex, `sum(x) = 1` and `x >= 0`, as `(C, b, meq)`.
pub fn simplex_constraints(n: usize) -> (DMatrix<f64>, DVector<f64>, usize) {
    let mut c = DMatrix::zeros(n, n + 1);
    c.column_mut(0).fill(1.0);
    for i in 0..n {
        c[(i, i + 1)] = 1.0;
    }
    let mut b = DVector::zeros(n + 1);
    b[0] = 1.0;
    (c, b, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(x: &DVector<f64>, expected: &[f64]) {
        for (v, e) in x.iter().zip(expected) {
            assert!((v - e).abs() < 1e-6, "{} != {:?}", x, expected);
        }
    }

    #[test]
    fn test_unconstrained_minimum_already_feasible() {
        let g = DMatrix::<f64>::identity(3, 3);
        let a = DVector::from_vec(vec![0.2, 0.5, 0.3]);
        let (c, b, meq) = simplex_constraints(3);
        let x = InteriorPoint::default().solve(&g, &a, &c, &b, meq).unwrap();
        assert_close(&x, &[0.2, 0.5, 0.3]);
    }

    #[test]
    fn test_projection_onto_simplex() {
        // With G = I the program is the euclidean projection of a onto the simplex.
        let g = DMatrix::<f64>::identity(3, 3);
        let a = DVector::from_vec(vec![0.9, 0.6, -0.5]);
        let (c, b, meq) = simplex_constraints(3);
        let x = InteriorPoint::default().solve(&g, &a, &c, &b, meq).unwrap();
        assert_close(&x, &[0.65, 0.35, 0.0]);
    }

    #[test]
    fn test_projection_of_far_point() {
        let g = DMatrix::<f64>::identity(2, 2);
        let a = DVector::from_vec(vec![5.0, -3.0]);
        let (c, b, meq) = simplex_constraints(2);
        let x = InteriorPoint::default().solve(&g, &a, &c, &b, meq).unwrap();
        assert_close(&x, &[1.0, 0.0]);
    }

    #[test]
    fn test_infeasible_program() {
        // x >= 1 and -x >= 0
        let g = DMatrix::<f64>::identity(1, 1);
        let a = DVector::from_vec(vec![0.0]);
        let c = DMatrix::from_row_slice(1, 2, &[1.0, -1.0]);
        let b = DVector::from_vec(vec![1.0, 0.0]);
        let res = InteriorPoint::default().solve(&g, &a, &c, &b, 0);
        assert!(matches!(res, Err(QuantificationError::Solver(_))));
    }

    #[test]
    fn test_not_positive_definite() {
        let g = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        let a = DVector::zeros(2);
        let (c, b, meq) = simplex_constraints(2);
        assert!(matches!(
            InteriorPoint::default().solve(&g, &a, &c, &b, meq),
            Err(QuantificationError::Solver(_))
        ));
    }
}
