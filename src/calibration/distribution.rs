//! Score distributions for HDy.
//!
//! Tables are flattened `(class, estimator)`-major: row `c` holds, estimator after
//! estimator, the `n_bins` histogram of that estimator's positive scores on the
//! training instances of class `c`. Index `estimator * n_bins + bin`.
use crate::errors::QuantificationError;
use serde::{Deserialize, Serialize};

/// Bin of a score on `n_bins` equal-width bins over `[0, 1]`. Scores are clamped, 1.0 lands in the last bin.
#[inline]
pub fn bin_index(score: f64, n_bins: usize) -> usize {
    let v = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
    ((v * n_bins as f64) as usize).min(n_bins - 1)
}

/// Counts of `scores` per bin.
pub fn histogram<'a>(scores: impl Iterator<Item = &'a f64>, n_bins: usize) -> Vec<f64> {
    let mut counts = vec![0.0; n_bins];
    for &s in scores {
        counts[bin_index(s, n_bins)] += 1.0;
    }
    counts
}

/// Training distribution table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionTable {
    pub n_bins: usize,
    pub n_estimators: usize,
    /// One flattened row per class, in class order.
    pub rows: Vec<Vec<f64>>,
}

impl DistributionTable {
    /// Build the table from out-of-fold scores.
    ///
    /// * `scores` - Positive-class scores per estimator, each of the training length.
    /// * `class_index` - Position of the true class of every training instance.
    /// * `n_classes` - Number of classes, the number of rows.
    /// * `n_bins` - Histogram bins.
    pub fn fit(
        scores: &[Vec<f64>],
        class_index: &[usize],
        n_classes: usize,
        n_bins: usize,
    ) -> Result<Self, QuantificationError> {
        if n_bins == 0 {
            return Err(QuantificationError::Configuration(
                "HDy requires a positive number of bins b".to_string(),
            ));
        }
        let mut rows = vec![Vec::with_capacity(scores.len() * n_bins); n_classes];
        for (c, row) in rows.iter_mut().enumerate() {
            let members: Vec<usize> = (0..class_index.len()).filter(|&i| class_index[i] == c).collect();
            let count = members.len() as f64;
            for s in scores {
                let mut h = histogram(members.iter().map(|&i| &s[i]), n_bins);
                if count > 0.0 {
                    h.iter_mut().for_each(|v| *v /= count);
                }
                row.extend(h);
            }
        }
        Ok(DistributionTable {
            n_bins,
            n_estimators: scores.len(),
            rows,
        })
    }

    /// Test table laid out like a training row: every estimator's histogram normalized by
    /// the sample size.
    pub fn test_row(&self, scores: &[Vec<f64>]) -> Result<Vec<f64>, QuantificationError> {
        if scores.len() != self.n_estimators {
            return Err(QuantificationError::DataShape(format!(
                "expected scores of {} estimators, found {}",
                self.n_estimators,
                scores.len()
            )));
        }
        let mut row = Vec::with_capacity(self.n_estimators * self.n_bins);
        for s in scores {
            let n = s.len() as f64;
            let mut h = histogram(s.iter(), self.n_bins);
            if n > 0.0 {
                h.iter_mut().for_each(|v| *v /= n);
            }
            row.extend(h);
        }
        Ok(row)
    }
}
