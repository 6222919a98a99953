//! Conditional decision matrix of the multiclass adjusted count.
//!
//! Every instance is assigned a single decision from the estimator scores: the class of
//! the highest scoring estimator (first in class order on ties), or for binary problems the
//! positive class when its score reaches 0.5. Row `i` of the matrix is the distribution of
//! decisions over the training instances of class `i`.
use crate::errors::QuantificationError;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Decision (class position) of every instance.
///
/// * `scores` - Scores per estimator, probabilities or hard predictions.
/// * `n_classes` - Number of classes. With two classes `scores` holds a single estimator.
pub fn decisions(scores: &[Vec<f64>], n_classes: usize) -> Vec<usize> {
    let n = scores.first().map_or(0, |s| s.len());
    (0..n)
        .map(|i| {
            if n_classes == 2 {
                usize::from(scores[0][i] >= 0.5)
            } else {
                let mut best = 0;
                for (j, s) in scores.iter().enumerate().skip(1) {
                    if s[i] > scores[best][i] {
                        best = j;
                    }
                }
                best
            }
        })
        .collect()
}

/// Relative frequency of every decision.
pub fn decision_frequencies(decisions: &[usize], n_classes: usize) -> Vec<f64> {
    let mut freq = vec![0.0; n_classes];
    for &d in decisions {
        freq[d] += 1.0;
    }
    if !decisions.is_empty() {
        freq.iter_mut().for_each(|f| *f /= decisions.len() as f64);
    }
    freq
}

/// `P(decision = j | true = i)` estimated on training data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalTable {
    /// `k x k`, row per true class. Rows of classes without instances are zero.
    pub matrix: DMatrix<f64>,
}

impl ConditionalTable {
    /// Build the table from out-of-fold scores.
    pub fn fit(scores: &[Vec<f64>], class_index: &[usize], n_classes: usize) -> Result<Self, QuantificationError> {
        let decided = decisions(scores, n_classes);
        if decided.len() != class_index.len() {
            return Err(QuantificationError::DataShape(
                "out-of-fold scores do not match the number of training labels".to_string(),
            ));
        }
        let mut matrix = DMatrix::zeros(n_classes, n_classes);
        for (&t, &d) in class_index.iter().zip(&decided) {
            matrix[(t, d)] += 1.0;
        }
        for mut row in matrix.row_iter_mut() {
            let total = row.sum();
            if total > 0.0 {
                row /= total;
            }
        }
        Ok(ConditionalTable { matrix })
    }

    /// Solve `P' p = f` by least squares.
    ///
    /// Only classes with a non-zero decision frequency take part, and among them only the
    /// ones with a calibrated row are unknowns. Every other class keeps zero. The solution is
    /// clipped to `[0, 1]`, not renormalized.
    pub fn adjust(&self, freq: &[f64]) -> Result<Vec<f64>, QuantificationError> {
        let k = self.matrix.nrows();
        if freq.len() != k {
            return Err(QuantificationError::DataShape(format!(
                "expected {} decision frequencies, found {}",
                k,
                freq.len()
            )));
        }
        let observed: Vec<usize> = (0..k).filter(|&j| freq[j] != 0.0).collect();
        let unknowns: Vec<usize> = observed
            .iter()
            .copied()
            .filter(|&i| self.matrix.row(i).iter().any(|&v| v != 0.0))
            .collect();
        let mut adjusted = vec![0.0; k];
        if unknowns.is_empty() {
            return Ok(adjusted);
        }

        // rows: equations for observed decisions j, columns: unknown classes i
        let a = DMatrix::from_fn(observed.len(), unknowns.len(), |r, c| self.matrix[(unknowns[c], observed[r])]);
        let b = DVector::from_iterator(observed.len(), observed.iter().map(|&j| freq[j]));
        let solution = a
            .svd(true, true)
            .solve(&b, 1e-12)
            .map_err(|e| QuantificationError::Solver(format!("least squares failed: {}", e)))?;
        for (&i, &v) in unknowns.iter().zip(solution.iter()) {
            adjusted[i] = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        }
        Ok(adjusted)
    }
}
