//! Conic programs handed to the clarabel interior point solver.
//!
//! Problems are stated in clarabel's standard form
//!
//! ```text
//! min 0.5 x'Px + q'x   subject to   Ax + s = b,  s in K
//! ```
//!
//! where `K` is the product of the cones given for consecutive blocks of rows of `A`.
use crate::errors::QuantificationError;
use clarabel::algebra::*;
use clarabel::solver::*;
use nalgebra::DMatrix;

/// Cone of a block of constraint rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cone {
    /// `s = 0`.
    Zero(usize),
    /// `s >= 0`.
    Nonnegative(usize),
    /// `s[0] >= ||s[1..]||`.
    SecondOrder(usize),
}

impl Cone {
    pub fn dim(&self) -> usize {
        match *self {
            Cone::Zero(n) | Cone::Nonnegative(n) | Cone::SecondOrder(n) => n,
        }
    }
}

/// Stopping rules of the interior point iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConicSettings {
    pub max_iter: u32,
    /// Absolute and relative duality gap, and feasibility tolerance.
    pub tol: f64,
}

impl Default for ConicSettings {
    fn default() -> Self {
        ConicSettings {
            max_iter: 200,
            tol: 1e-10,
        }
    }
}

/// Compressed sparse column copy of `m`, restricted to the upper triangle when `upper` is set.
fn to_csc(m: &DMatrix<f64>, upper: bool) -> CscMatrix<f64> {
    let mut colptr = Vec::with_capacity(m.ncols() + 1);
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();
    colptr.push(0);
    for j in 0..m.ncols() {
        let last = if upper { (j + 1).min(m.nrows()) } else { m.nrows() };
        for i in 0..last {
            let v = m[(i, j)];
            if v != 0.0 {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr.push(rowval.len());
    }
    CscMatrix::new(m.nrows(), m.ncols(), colptr, rowval, nzval)
}

/// Solve the conic program, returning the primal solution `x`.
///
/// * `p` - Symmetric positive semidefinite `n x n` matrix, only its upper triangle is read.
/// * `q` - Linear term, length `n`.
/// * `a` - Constraint matrix, one row per cone coordinate.
/// * `b` - Constraint offsets.
/// * `cones` - Cones of consecutive row blocks of `a`.
pub fn solve_conic(
    p: &DMatrix<f64>,
    q: &[f64],
    a: &DMatrix<f64>,
    b: &[f64],
    cones: &[Cone],
    settings: &ConicSettings,
) -> Result<Vec<f64>, QuantificationError> {
    let n = q.len();
    let rows: usize = cones.iter().map(Cone::dim).sum();
    if p.nrows() != n || p.ncols() != n || a.ncols() != n || a.nrows() != rows || b.len() != rows {
        return Err(QuantificationError::DataShape(format!(
            "inconsistent conic program: P {}x{}, q {}, A {}x{}, b {}, cone rows {}",
            p.nrows(),
            p.ncols(),
            n,
            a.nrows(),
            a.ncols(),
            b.len(),
            rows
        )));
    }

    let solver_settings = DefaultSettingsBuilder::default()
        .verbose(false)
        .max_iter(settings.max_iter)
        .tol_gap_abs(settings.tol)
        .tol_gap_rel(settings.tol)
        .tol_feas(settings.tol)
        .build()
        .map_err(|e| QuantificationError::Solver(format!("invalid solver settings: {}", e)))?;
    let cones: Vec<_> = cones
        .iter()
        .map(|c| match *c {
            Cone::Zero(n) => ZeroConeT(n),
            Cone::Nonnegative(n) => NonnegativeConeT(n),
            Cone::SecondOrder(n) => SecondOrderConeT(n),
        })
        .collect();

    let mut solver = DefaultSolver::new(&to_csc(p, true), q, &to_csc(a, false), b, &cones, solver_settings);
    solver.solve();
    match solver.solution.status {
        SolverStatus::Solved | SolverStatus::AlmostSolved => {}
        status => {
            return Err(QuantificationError::Solver(format!(
                "interior point solver stopped with status {:?}",
                status
            )))
        }
    }
    let x = solver.solution.x.clone();
    if x.iter().any(|v| !v.is_finite()) {
        return Err(QuantificationError::Solver("solution is not finite".to_string()));
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_triangle_csc() {
        let m = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let csc = to_csc(&m, true);
        assert_eq!(csc.colptr, vec![0, 1, 3]);
        assert_eq!(csc.rowval, vec![0, 0, 1]);
        assert_eq!(csc.nzval, vec![2.0, 1.0, 3.0]);
        let full = to_csc(&m, false);
        assert_eq!(full.nzval.len(), 4);
    }

    #[test]
    fn test_linear_program_on_simplex() {
        // min x0 + 2 x1 subject to x0 + x1 = 1, x >= 0
        let p = DMatrix::zeros(2, 2);
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, -1.0, 0.0, 0.0, -1.0]);
        let b = [1.0, 0.0, 0.0];
        let x = solve_conic(
            &p,
            &[1.0, 2.0],
            &a,
            &b,
            &[Cone::Zero(1), Cone::Nonnegative(2)],
            &ConicSettings::default(),
        )
        .unwrap();
        assert!((x[0] - 1.0).abs() < 1e-6, "{:?}", x);
        assert!(x[1].abs() < 1e-6, "{:?}", x);
    }

    #[test]
    fn test_inconsistent_dimensions() {
        let p = DMatrix::zeros(2, 2);
        let a = DMatrix::zeros(1, 2);
        let res = solve_conic(&p, &[0.0, 0.0], &a, &[0.0], &[Cone::Nonnegative(2)], &ConicSettings::default());
        assert!(matches!(res, Err(QuantificationError::DataShape(_))));
    }
}
