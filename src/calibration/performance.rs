//! Performance calibration of the estimators, consumed by AC and PAC.
use crate::bank::EstimatorBank;
use crate::calibration::estimator_folds;
use crate::classifier::Classifier;
use crate::data::{binarize, Matrix};
use crate::errors::QuantificationError;
use crate::parallel::parallel_map;
use crate::validation::{cross_val_confusion, ConfusionMatrix};
use log::{debug, warn};
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Confusion statistics of one estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    /// True positive rate, mean over folds.
    pub tpr: f64,
    /// False positive rate, mean over folds.
    pub fpr: f64,
    /// Mean positive probability on training positives.
    pub tp_pa: Option<f64>,
    /// Mean positive probability on training negatives.
    pub fp_pa: Option<f64>,
}

/// Performance of every estimator keyed by its class.
pub type PerformanceTable = BTreeMap<usize, Performance>;

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Mean of `values` over the rows where `y_bin` equals `positive`.
fn mean_where(values: &[f64], y_bin: &[f64], positive: bool) -> f64 {
    mean(values.iter().zip(y_bin).filter(|(_, &t)| (t > 0.5) == positive).map(|(&v, _)| v))
}

/// Calibrate one fitted estimator on its binarized training targets.
///
/// `folds` is the fold count of the class labels, see [`calibration_folds`](crate::calibration::calibration_folds).
pub fn estimator_performance<C: Classifier + Clone>(
    estimator: &C,
    data: &Matrix<f64>,
    y_bin: &[f64],
    folds: usize,
    seed: u64,
) -> Result<Performance, QuantificationError> {
    let k = estimator_folds(folds, y_bin);
    let (tpr, fpr) = if k <= 1 {
        warn!(
            "Too few samples of a class for cross-validation, computing the rates of {} in sample",
            estimator.name()
        );
        let cm = ConfusionMatrix::new(y_bin, &estimator.predict(data)?);
        (cm.tpr(), cm.fpr())
    } else {
        let matrices = cross_val_confusion(estimator, data, y_bin, k, seed)?;
        (
            mean(matrices.iter().map(|cm| cm.tpr())),
            mean(matrices.iter().map(|cm| cm.fpr())),
        )
    };

    let (tp_pa, fp_pa) = if estimator.supports_proba() {
        let proba = estimator.predict_proba(data)?;
        (Some(mean_where(&proba, y_bin, true)), Some(mean_where(&proba, y_bin, false)))
    } else {
        (None, None)
    };
    Ok(Performance { tpr, fpr, tp_pa, fp_pa })
}

/// Calibrate every estimator of the bank on the pool.
pub fn calibrate_performance<C: Classifier + Clone>(
    bank: &EstimatorBank<C>,
    data: &Matrix<f64>,
    y: &[usize],
    folds: usize,
    seed: u64,
    pool: &ThreadPool,
) -> Result<PerformanceTable, QuantificationError> {
    let estimators: Vec<(usize, &C)> = bank.iter().map(|(c, e)| (*c, e)).collect();
    let classes: Vec<usize> = estimators.iter().map(|(c, _)| *c).collect();
    let perf = parallel_map(pool, estimators, |_, (class, estimator)| {
        let p = estimator_performance(estimator, data, &binarize(y, class), folds, seed)?;
        debug!("Class {}: tpr {:.4}, fpr {:.4}", class, p.tpr, p.fpr);
        Ok(p)
    })?;
    Ok(classes.into_iter().zip(perf).collect())
}
