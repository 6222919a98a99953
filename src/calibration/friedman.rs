//! Indicator matrix of the Friedman adjusted count.
//!
//! Every instance gets a score vector over the classes (binary: `[1 - p, p]`,
//! multiclass: the estimators' probabilities normalized by their sum). Its indicator
//! vector flags the classes whose score exceeds the training prevalence. Column `i` of
//! `V` is the mean indicator vector over the training instances of class `i`.
use crate::errors::QuantificationError;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Per-instance score vectors from the positive-class probabilities of the estimators.
///
/// * `probas` - One vector per estimator, all of the sample length.
/// * `n_classes` - Number of classes. With two classes `probas` holds a single estimator.
pub fn score_vectors(probas: &[Vec<f64>], n_classes: usize) -> Vec<Vec<f64>> {
    let n = probas.first().map_or(0, |p| p.len());
    (0..n)
        .map(|i| {
            if n_classes == 2 {
                let p = probas[0][i];
                vec![1.0 - p, p]
            } else {
                let row: Vec<f64> = probas.iter().map(|p| p[i]).collect();
                let total: f64 = row.iter().sum();
                if total > 0.0 {
                    row.into_iter().map(|v| v / total).collect()
                } else {
                    row
                }
            }
        })
        .collect()
}

/// Mean over `rows` of the indicator `score_j > prevalence_j`.
pub fn mean_indicator<'a>(rows: impl Iterator<Item = &'a Vec<f64>>, prevalence: &[f64]) -> Vec<f64> {
    let mut sums = vec![0.0; prevalence.len()];
    let mut n = 0usize;
    for row in rows {
        for ((s, &v), &p) in sums.iter_mut().zip(row).zip(prevalence) {
            if v > p {
                *s += 1.0;
            }
        }
        n += 1;
    }
    if n > 0 {
        sums.iter_mut().for_each(|s| *s /= n as f64);
    }
    sums
}

/// Training prevalence and the indicator matrix `V`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriedmanTable {
    /// Training prevalence, in class order.
    pub prevalence: Vec<f64>,
    /// `k x k`, column `i` for true class `i`.
    pub v: DMatrix<f64>,
}

impl FriedmanTable {
    /// Build the table from out-of-fold probabilities.
    ///
    /// * `probas` - Out-of-fold positive probabilities per estimator.
    /// * `class_index` - Position of the true class of every training instance.
    /// * `n_classes` - Number of classes.
    pub fn fit(probas: &[Vec<f64>], class_index: &[usize], n_classes: usize) -> Result<Self, QuantificationError> {
        let n = class_index.len();
        if n == 0 {
            return Err(QuantificationError::DataShape("training data is empty".to_string()));
        }
        if probas.iter().any(|p| p.len() != n) {
            return Err(QuantificationError::DataShape(
                "out-of-fold scores do not match the number of training labels".to_string(),
            ));
        }
        let mut prevalence = vec![0.0; n_classes];
        for &c in class_index {
            prevalence[c] += 1.0;
        }
        prevalence.iter_mut().for_each(|p| *p /= n as f64);

        let scores = score_vectors(probas, n_classes);
        let mut v = DMatrix::zeros(n_classes, n_classes);
        for i in 0..n_classes {
            let members = scores.iter().zip(class_index).filter(|(_, &c)| c == i).map(|(s, _)| s);
            v.set_column(i, &DVector::from_vec(mean_indicator(members, &prevalence)));
        }
        Ok(FriedmanTable { prevalence, v })
    }

    /// Mean indicator vector `U` of a test sample, using the training prevalence.
    pub fn test_indicators(&self, probas: &[Vec<f64>]) -> DVector<f64> {
        let scores = score_vectors(probas, self.prevalence.len());
        DVector::from_vec(mean_indicator(scores.iter(), &self.prevalence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_vectors() {
        assert_eq!(score_vectors(&[vec![0.25]], 2), vec![vec![0.75, 0.25]]);
        let s = score_vectors(&[vec![0.2, 0.0], vec![0.6, 0.0], vec![0.2, 0.0]], 3);
        assert_eq!(s[0], vec![0.2, 0.6, 0.2]);
        assert_eq!(s[1], vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_binary_table() {
        let probas = vec![vec![0.1, 0.3, 0.6, 0.9, 0.8, 0.4]];
        let class_index = vec![0, 0, 0, 1, 1, 1];
        let t = FriedmanTable::fit(&probas, &class_index, 2).unwrap();
        assert_eq!(t.prevalence, vec![0.5, 0.5]);
        // class 0 rows [0.9, 0.1], [0.7, 0.3], [0.4, 0.6]
        assert!((t.v[(0, 0)] - 2.0 / 3.0).abs() < 1e-12);
        assert!((t.v[(1, 0)] - 1.0 / 3.0).abs() < 1e-12);
        // class 1 rows [0.1, 0.9], [0.2, 0.8], [0.6, 0.4]
        assert!((t.v[(0, 1)] - 1.0 / 3.0).abs() < 1e-12);
        assert!((t.v[(1, 1)] - 2.0 / 3.0).abs() < 1e-12);

        let u = t.test_indicators(&[vec![0.9, 0.7]]);
        assert_eq!(u.as_slice(), &[0.0, 1.0]);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(FriedmanTable::fit(&[vec![0.1]], &[0, 1], 2).is_err());
    }
}
