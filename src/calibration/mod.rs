//! Calibration Module
//!
//! Tables computed at fit time from the training data and consumed by the adjusted
//! prevalence strategies. Everything estimated on training instances is computed out of
//! fold. The fold count is capped by the smallest class of the training labels, folds are
//! stratified on the binarized labels of each estimator.
//!
//! # Submodules
//!
//! * `performance`: cross-validated TPR / FPR and mean probabilities on positives and negatives.
//! * `distribution`: per-class score histograms for HDy.
//! * `friedman`: the indicator matrix V of the Friedman correction.
//! * `conditional`: the conditional decision matrix of the multiclass adjusted count.

pub mod conditional;
pub mod distribution;
pub mod friedman;
pub mod performance;

use crate::bank::EstimatorBank;
use crate::classifier::Classifier;
use crate::data::{binarize, Matrix};
use crate::errors::QuantificationError;
use crate::parallel::parallel_map;
use crate::validation::{binary_labels, cross_val_predict, cross_val_predict_proba, effective_folds};
use log::debug;
use rayon::ThreadPool;

/// Calibration folds for the class labels `y`: the requested amount capped by the count of
/// the smallest class. One or fewer means resubstitution.
pub fn calibration_folds(requested: usize, y: &[usize]) -> usize {
    effective_folds(requested, y)
}

/// `folds` capped so that every fold holds both sides of the binarized targets `y_bin`.
pub(crate) fn estimator_folds(folds: usize, y_bin: &[f64]) -> usize {
    effective_folds(folds, &binary_labels(y_bin))
}

/// Out-of-fold scores of every estimator of the bank, in class order.
///
/// `folds` is the fold count returned by [`calibration_folds`]. Scores are positive-class
/// probabilities when `proba` is set, hard predictions otherwise. Estimators whose binarized
/// labels do not allow two folds are scored in sample.
pub fn out_of_fold_scores<C: Classifier + Clone>(
    bank: &EstimatorBank<C>,
    data: &Matrix<f64>,
    y: &[usize],
    folds: usize,
    seed: u64,
    proba: bool,
    pool: &ThreadPool,
) -> Result<Vec<Vec<f64>>, QuantificationError> {
    let estimators: Vec<(usize, &C)> = bank.iter().map(|(c, e)| (*c, e)).collect();
    parallel_map(pool, estimators, |_, (class, estimator)| {
        let y_bin = binarize(y, class);
        let k = estimator_folds(folds, &y_bin);
        debug!("Out-of-fold scores for class {} with {} folds", class, k);
        match (k > 1, proba) {
            (true, true) => cross_val_predict_proba(estimator, data, &y_bin, k, seed),
            (true, false) => cross_val_predict(estimator, data, &y_bin, k, seed),
            (false, true) => estimator.predict_proba(data),
            (false, false) => estimator.predict(data),
        }
    })
}
