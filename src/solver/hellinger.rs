//! Hellinger distance mixture matching used by HDy.
//!
//! Given one training distribution per class (rows of `train`, all flattened the same way)
//! and an observed test distribution `q`, find the mixture weights on the probability simplex
//! whose weighted sum `m` of class distributions is closest to `q` in Hellinger distance.
//!
//! The squared distance is `sum(m) + sum(q) - 2 sum(sqrt(m q))`. With one auxiliary variable
//! `t_j <= sqrt(m_j)` per bin the minimization is a second-order cone program
//!
//! ```text
//! min sum(m) - 2 sum(sqrt(q_j) t_j)   subject to   sum(alpha) = 1, alpha >= 0, t_j^2 <= m_j
//! ```
//!
//! solved by clarabel.
use crate::errors::QuantificationError;
use crate::solver::conic::{solve_conic, Cone, ConicSettings};
use nalgebra::DMatrix;

/// Hellinger distance `sqrt(sum((sqrt(p) - sqrt(q))^2))`.
pub fn hellinger_distance(p: &[f64], q: &[f64]) -> f64 {
    p.iter()
        .zip(q)
        .map(|(a, b)| (a.max(0.0).sqrt() - b.max(0.0).sqrt()).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// `sum_c alpha[c] * train[c]`.
pub fn mixture(alpha: &[f64], train: &[Vec<f64>]) -> Vec<f64> {
    let width = train.first().map_or(0, |r| r.len());
    let mut m = vec![0.0; width];
    for (a, row) in alpha.iter().zip(train) {
        for (mj, r) in m.iter_mut().zip(row) {
            *mj += a * r;
        }
    }
    m
}

/// Mixture search over the probability simplex.
#[derive(Debug, Clone, Copy, Default)]
pub struct HellingerSolver {
    pub settings: ConicSettings,
}

impl HellingerSolver {
    /// Mixture weights minimizing the Hellinger distance between `mixture(alpha, train)` and `test`.
    ///
    /// * `train` - One row per class, every row the same length as `test`.
    /// * `test` - Observed distribution.
    pub fn solve(&self, train: &[Vec<f64>], test: &[f64]) -> Result<Vec<f64>, QuantificationError> {
        let k = train.len();
        if k == 0 {
            return Err(QuantificationError::DataShape("no class distributions to mix".to_string()));
        }
        if let Some(row) = train.iter().find(|r| r.len() != test.len()) {
            return Err(QuantificationError::DataShape(format!(
                "class distribution has {} entries but the test distribution has {}",
                row.len(),
                test.len()
            )));
        }

        // Bins where both sides can be positive, the others only add a constant.
        let bins: Vec<usize> = (0..test.len())
            .filter(|&j| test[j] > 0.0 && train.iter().any(|r| r[j] > 0.0))
            .collect();
        let m = bins.len();
        let n = k + m;

        // Variables are alpha followed by one t per kept bin.
        let mut q = vec![0.0; n];
        for (c, row) in train.iter().enumerate() {
            q[c] = row.iter().map(|v| v.max(0.0)).sum();
        }
        for (i, &j) in bins.iter().enumerate() {
            q[k + i] = -2.0 * test[j].sqrt();
        }

        let rows = 1 + k + 3 * m;
        let mut a = DMatrix::zeros(rows, n);
        let mut b = vec![0.0; rows];
        for c in 0..k {
            a[(0, c)] = 1.0;
            a[(1 + c, c)] = -1.0;
        }
        b[0] = 1.0;
        // (m_j + 1, 2 t_j, m_j - 1) in the second order cone is t_j^2 <= m_j.
        for (i, &j) in bins.iter().enumerate() {
            let r = 1 + k + 3 * i;
            for (c, row) in train.iter().enumerate() {
                a[(r, c)] = -row[j];
                a[(r + 2, c)] = -row[j];
            }
            a[(r + 1, k + i)] = -2.0;
            b[r] = 1.0;
            b[r + 2] = -1.0;
        }
        let mut cones = vec![Cone::Zero(1), Cone::Nonnegative(k)];
        cones.extend(std::iter::repeat(Cone::SecondOrder(3)).take(m));

        let x = solve_conic(&DMatrix::zeros(n, n), &q, &a, &b, &cones, &self.settings)?;
        let alpha: Vec<f64> = x[..k].iter().map(|v| v.max(0.0)).collect();
        let total: f64 = alpha.iter().sum();
        if total <= 0.0 {
            return Err(QuantificationError::Solver("mixture weights vanished".to_string()));
        }
        Ok(alpha.into_iter().map(|v| v / total).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hellinger_distance() {
        assert_eq!(hellinger_distance(&[0.5, 0.5], &[0.5, 0.5]), 0.0);
        assert!((hellinger_distance(&[1.0, 0.0], &[0.0, 1.0]) - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_exact_binary_mixture() {
        let train = vec![vec![0.5, 0.5, 0.0, 0.0], vec![0.0, 0.0, 0.5, 0.5]];
        let test = mixture(&[0.3, 0.7], &train);
        let alpha = HellingerSolver::default().solve(&train, &test).unwrap();
        assert!((alpha[0] - 0.3).abs() < 1e-4, "{:?}", alpha);
        assert!((alpha[1] - 0.7).abs() < 1e-4, "{:?}", alpha);
    }

    #[test]
    fn test_minimum_against_brute_force_grid() {
        // Overlapping class distributions over 4 bins and a test distribution that is not
        // an exact mixture of them.
        let train = vec![
            vec![0.6, 0.3, 0.1, 0.0],
            vec![0.1, 0.5, 0.3, 0.1],
            vec![0.0, 0.1, 0.3, 0.6],
        ];
        let test = vec![0.35, 0.15, 0.1, 0.4];
        let alpha = HellingerSolver::default().solve(&train, &test).unwrap();
        assert!((alpha.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(alpha.iter().all(|&a| (0.0..=1.0).contains(&a)));
        let found = hellinger_distance(&mixture(&alpha, &train), &test);

        let steps = 100;
        let mut grid_best = f64::INFINITY;
        for i in 0..=steps {
            for j in 0..=(steps - i) {
                let a = [
                    i as f64 / steps as f64,
                    j as f64 / steps as f64,
                    (steps - i - j) as f64 / steps as f64,
                ];
                grid_best = grid_best.min(hellinger_distance(&mixture(&a, &train), &test));
            }
        }
        assert!(found <= grid_best + 1e-6, "found {} but grid reaches {}", found, grid_best);
    }

    #[test]
    fn test_solution_on_simplex_edge() {
        // Test distribution equal to class 2; classes 0 and 1 must vanish.
        let train = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
        let alpha = HellingerSolver::default().solve(&train, &[0.0, 0.0, 1.0]).unwrap();
        assert!(alpha[2] > 1.0 - 1e-4, "{:?}", alpha);
    }

    #[test]
    fn test_shape_mismatch() {
        let train = vec![vec![1.0, 0.0]];
        assert!(HellingerSolver::default().solve(&train, &[1.0]).is_err());
        assert!(HellingerSolver::default().solve(&[], &[1.0]).is_err());
    }
}
