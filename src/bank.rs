//! Estimator Bank
//!
//! One binary classifier per class, trained one-vs-all. Two-class problems train a
//! single estimator for the positive (second) class.
use crate::classifier::{apply_params, Classifier};
use crate::data::{binarize, Matrix};
use crate::errors::QuantificationError;
use crate::grid_search::grid_search;
use crate::parallel::parallel_map;
use crate::quantifier::config::QuantifierConfig;
use log::{debug, info};
use rayon::ThreadPool;
use std::collections::BTreeMap;

/// Fitted one-vs-all estimators keyed by class label.
#[derive(Clone, Debug)]
pub struct EstimatorBank<C> {
    classes: Vec<usize>,
    estimators: BTreeMap<usize, C>,
}

impl<C: Classifier + Clone> EstimatorBank<C> {
    /// Train one estimator per positive class of `classes` on the pool.
    ///
    /// * `prototype` - Unfitted classifier cloned for every class.
    /// * `cfg` - Fixed parameters, grid and grid search settings.
    /// * `data` - Training features.
    /// * `y` - Training labels.
    /// * `classes` - Sorted unique labels of `y`, at least two.
    pub fn fit(
        prototype: &C,
        cfg: &QuantifierConfig,
        data: &Matrix<f64>,
        y: &[usize],
        classes: &[usize],
        pool: &ThreadPool,
    ) -> Result<Self, QuantificationError> {
        let positives = positive_classes(classes);
        info!(
            "Training {} {} estimator(s) for {} classes",
            positives.len(),
            prototype.name(),
            classes.len()
        );
        let fitted = parallel_map(pool, positives.clone(), |_, class| {
            let y_bin = binarize(y, class);
            let mut clf = prototype.clone();
            apply_params(&mut clf, &cfg.estimator_params)?;
            if cfg.estimator_grid.is_empty() {
                clf.fit(data, &y_bin)?;
                Ok(clf)
            } else {
                let res = grid_search(&clf, &cfg.estimator_grid, &cfg.grid_search, data, &y_bin, cfg.seed)?;
                debug!(
                    "Class {}: best parameters {:?} with score {:.4}",
                    class, res.best_params, res.best_score
                );
                Ok(res.best_estimator)
            }
        })?;
        Ok(EstimatorBank {
            classes: classes.to_vec(),
            estimators: positives.into_iter().zip(fitted).collect(),
        })
    }
}

impl<C: Classifier> EstimatorBank<C> {
    /// All classes seen at fit.
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    pub fn is_binary(&self) -> bool {
        self.classes.len() == 2
    }

    /// Number of fitted estimators.
    pub fn len(&self) -> usize {
        self.estimators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimators.is_empty()
    }

    /// Estimators in ascending class order.
    pub fn iter(&self) -> impl Iterator<Item = (&usize, &C)> {
        self.estimators.iter()
    }

    pub fn get(&self, class: usize) -> Option<&C> {
        self.estimators.get(&class)
    }

    /// Whether every estimator exposes probabilities.
    pub fn supports_proba(&self) -> bool {
        self.estimators.values().all(|c| c.supports_proba())
    }

    /// Name of the first estimator without probability output.
    pub fn crisp_estimator_name(&self) -> Option<String> {
        self.estimators.values().find(|c| !c.supports_proba()).map(|c| c.name())
    }

    /// Hard predictions of every estimator, in class order.
    pub fn predict_all(&self, data: &Matrix<f64>) -> Result<Vec<Vec<f64>>, QuantificationError> {
        self.estimators.values().map(|c| c.predict(data)).collect()
    }

    /// Positive-class probabilities of every estimator, in class order.
    pub fn predict_proba_all(&self, data: &Matrix<f64>) -> Result<Vec<Vec<f64>>, QuantificationError> {
        if let Some(name) = self.crisp_estimator_name() {
            return Err(QuantificationError::UnsupportedEstimator(name));
        }
        self.estimators.values().map(|c| c.predict_proba(data)).collect()
    }

    /// Scores used to rank classes: probabilities when available, hard predictions otherwise.
    pub fn scores_all(&self, data: &Matrix<f64>) -> Result<Vec<Vec<f64>>, QuantificationError> {
        if self.supports_proba() {
            self.predict_proba_all(data)
        } else {
            self.predict_all(data)
        }
    }
}

/// Classes that get an estimator: the second class for binary problems, all otherwise.
pub fn positive_classes(classes: &[usize]) -> Vec<usize> {
    if classes.len() == 2 {
        vec![classes[1]]
    } else {
        classes.to_vec()
    }
}
