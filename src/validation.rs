//! Validation
//!
//! Stratified k-fold cross-validation, confusion matrices and the scores used to
//! calibrate the estimators of a quantifier.
use crate::classifier::Classifier;
use crate::data::Matrix;
use crate::errors::QuantificationError;
use crate::utils::items_to_strings;
use hashbrown::HashMap;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Scoring functions available for cross-validation and grid search.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scoring {
    #[default]
    Accuracy,
    TruePositiveRate,
    FalsePositiveRate,
    LogLoss,
}

impl Scoring {
    /// Whether larger values are better.
    pub fn maximize(&self) -> bool {
        match self {
            Scoring::Accuracy | Scoring::TruePositiveRate => true,
            Scoring::FalsePositiveRate | Scoring::LogLoss => false,
        }
    }

    /// Score a fitted classifier on held-out data.
    pub fn score<C: Classifier>(&self, clf: &C, data: &Matrix<f64>, y: &[f64]) -> Result<f64, QuantificationError> {
        match self {
            Scoring::Accuracy => {
                let cm = ConfusionMatrix::new(y, &clf.predict(data)?);
                Ok((cm.tp + cm.tn) / cm.total())
            }
            Scoring::TruePositiveRate => true_positive_rate(clf, data, y),
            Scoring::FalsePositiveRate => false_positive_rate(clf, data, y),
            Scoring::LogLoss => Ok(log_loss(y, &clf.predict_proba(data)?)),
        }
    }
}

impl FromStr for Scoring {
    type Err = QuantificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accuracy" => Ok(Scoring::Accuracy),
            "tpr" => Ok(Scoring::TruePositiveRate),
            "fpr" => Ok(Scoring::FalsePositiveRate),
            "log_loss" => Ok(Scoring::LogLoss),
            _ => Err(QuantificationError::ParseString(
                s.to_string(),
                "Scoring".to_string(),
                items_to_strings(vec!["accuracy", "tpr", "fpr", "log_loss"]),
            )),
        }
    }
}

/// Binary confusion matrix, counts as floats.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConfusionMatrix {
    pub tn: f64,
    pub fp: f64,
    pub fn_: f64,
    pub tp: f64,
}

impl ConfusionMatrix {
    /// Count outcomes of hard predictions against binary targets.
    pub fn new(y_true: &[f64], y_pred: &[f64]) -> Self {
        let mut cm = ConfusionMatrix::default();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t > 0.5, p > 0.5) {
                (false, false) => cm.tn += 1.0,
                (false, true) => cm.fp += 1.0,
                (true, false) => cm.fn_ += 1.0,
                (true, true) => cm.tp += 1.0,
            }
        }
        cm
    }

    pub fn total(&self) -> f64 {
        self.tn + self.fp + self.fn_ + self.tp
    }

    /// `tp / (tp + fn)`; NaN without positives.
    pub fn tpr(&self) -> f64 {
        self.tp / (self.tp + self.fn_)
    }

    /// `fp / (fp + tn)`; NaN without negatives.
    pub fn fpr(&self) -> f64 {
        self.fp / (self.fp + self.tn)
    }
}

/// True positive rate of a fitted classifier.
pub fn true_positive_rate<C: Classifier>(clf: &C, data: &Matrix<f64>, y: &[f64]) -> Result<f64, QuantificationError> {
    Ok(ConfusionMatrix::new(y, &clf.predict(data)?).tpr())
}

/// False positive rate of a fitted classifier.
pub fn false_positive_rate<C: Classifier>(
    clf: &C,
    data: &Matrix<f64>,
    y: &[f64],
) -> Result<f64, QuantificationError> {
    Ok(ConfusionMatrix::new(y, &clf.predict(data)?).fpr())
}

/// Mean negative log likelihood of binary targets under positive-class probabilities.
pub fn log_loss(y: &[f64], proba: &[f64]) -> f64 {
    if y.is_empty() {
        return 0.0;
    }
    let eps = 1e-15;
    y.iter()
        .zip(proba)
        .map(|(&y_, &p)| {
            let p = p.clamp(eps, 1.0 - eps);
            -(y_ * p.ln() + (1.0 - y_) * (1.0 - p).ln())
        })
        .sum::<f64>()
        / y.len() as f64
}

/// Count of each label.
pub fn class_counts(labels: &[usize]) -> HashMap<usize, usize> {
    let mut counts = HashMap::new();
    for &l in labels {
        *counts.entry(l).or_insert(0) += 1;
    }
    counts
}

/// Binary targets as labels.
pub fn binary_labels(y: &[f64]) -> Vec<usize> {
    y.iter().map(|&v| usize::from(v > 0.5)).collect()
}

/// Number of folds to use: the requested amount, capped by the smallest class so that
/// every fold holds every class.
pub fn effective_folds(requested: usize, labels: &[usize]) -> usize {
    let min_count = class_counts(labels).values().copied().min().unwrap_or(0);
    requested.min(min_count)
}

/// Stratified k-fold split, returning the test indices of every fold.
///
/// Indices of each class are shuffled with the seed and dealt round-robin, so fold sizes
/// per class differ by at most one.
pub fn stratified_folds(labels: &[usize], folds: usize, seed: u64) -> Vec<Vec<usize>> {
    let folds = folds.max(1);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut by_class: Vec<(usize, Vec<usize>)> = Vec::new();
    for (i, &l) in labels.iter().enumerate() {
        match by_class.iter_mut().find(|(c, _)| *c == l) {
            Some((_, idx)) => idx.push(i),
            None => by_class.push((l, vec![i])),
        }
    }
    by_class.sort_by_key(|(c, _)| *c);

    let mut test = vec![Vec::new(); folds];
    let mut offset = 0;
    for (_, mut idx) in by_class {
        idx.shuffle(&mut rng);
        for (n, i) in idx.iter().enumerate() {
            test[(offset + n) % folds].push(*i);
        }
        offset += idx.len();
    }
    for t in test.iter_mut() {
        t.sort_unstable();
    }
    test
}

/// Indices not present in `test`, `test` being sorted.
pub fn complement(n: usize, test: &[usize]) -> Vec<usize> {
    (0..n).filter(|i| test.binary_search(i).is_err()).collect()
}

fn fit_on<C: Classifier + Clone>(
    prototype: &C,
    data: &Matrix<f64>,
    y: &[f64],
    rows: &[usize],
) -> Result<C, QuantificationError> {
    let buf = data.select_rows(rows);
    let sub = Matrix::new(&buf, rows.len(), data.cols);
    let y_sub: Vec<f64> = rows.iter().map(|&i| y[i]).collect();
    let mut clf = prototype.clone();
    clf.fit(&sub, &y_sub)?;
    Ok(clf)
}

/// Score the prototype on every fold, training a fresh clone on the remaining folds.
pub fn cross_val_score<C: Classifier + Clone>(
    prototype: &C,
    data: &Matrix<f64>,
    y: &[f64],
    folds: usize,
    scoring: Scoring,
    seed: u64,
) -> Result<Vec<f64>, QuantificationError> {
    let splits = stratified_folds(&binary_labels(y), folds, seed);
    let mut scores = Vec::with_capacity(splits.len());
    for test in splits.iter().filter(|t| !t.is_empty()) {
        let train = complement(y.len(), test);
        let clf = fit_on(prototype, data, y, &train)?;
        let buf = data.select_rows(test);
        let sub = Matrix::new(&buf, test.len(), data.cols);
        let y_test: Vec<f64> = test.iter().map(|&i| y[i]).collect();
        scores.push(scoring.score(&clf, &sub, &y_test)?);
    }
    Ok(scores)
}

/// Confusion matrix of every fold, training a fresh clone on the remaining folds.
pub fn cross_val_confusion<C: Classifier + Clone>(
    prototype: &C,
    data: &Matrix<f64>,
    y: &[f64],
    folds: usize,
    seed: u64,
) -> Result<Vec<ConfusionMatrix>, QuantificationError> {
    let splits = stratified_folds(&binary_labels(y), folds, seed);
    let mut matrices = Vec::with_capacity(splits.len());
    for test in splits.iter().filter(|t| !t.is_empty()) {
        let train = complement(y.len(), test);
        let clf = fit_on(prototype, data, y, &train)?;
        let buf = data.select_rows(test);
        let sub = Matrix::new(&buf, test.len(), data.cols);
        let y_test: Vec<f64> = test.iter().map(|&i| y[i]).collect();
        matrices.push(ConfusionMatrix::new(&y_test, &clf.predict(&sub)?));
    }
    Ok(matrices)
}

fn cross_val_apply<C, F>(
    prototype: &C,
    data: &Matrix<f64>,
    y: &[f64],
    folds: usize,
    seed: u64,
    apply: F,
) -> Result<Vec<f64>, QuantificationError>
where
    C: Classifier + Clone,
    F: Fn(&C, &Matrix<f64>) -> Result<Vec<f64>, QuantificationError>,
{
    let mut out = vec![0.0; y.len()];
    for test in stratified_folds(&binary_labels(y), folds, seed).iter().filter(|t| !t.is_empty()) {
        let train = complement(y.len(), test);
        let clf = fit_on(prototype, data, y, &train)?;
        let buf = data.select_rows(test);
        let sub = Matrix::new(&buf, test.len(), data.cols);
        for (&i, v) in test.iter().zip(apply(&clf, &sub)?) {
            out[i] = v;
        }
    }
    Ok(out)
}

/// Out-of-fold positive-class probabilities.
pub fn cross_val_predict_proba<C: Classifier + Clone>(
    prototype: &C,
    data: &Matrix<f64>,
    y: &[f64],
    folds: usize,
    seed: u64,
) -> Result<Vec<f64>, QuantificationError> {
    if !prototype.supports_proba() {
        return Err(QuantificationError::UnsupportedEstimator(prototype.name()));
    }
    cross_val_apply(prototype, data, y, folds, seed, |clf, sub| clf.predict_proba(sub))
}

/// Out-of-fold hard predictions.
pub fn cross_val_predict<C: Classifier + Clone>(
    prototype: &C,
    data: &Matrix<f64>,
    y: &[f64],
    folds: usize,
    seed: u64,
) -> Result<Vec<f64>, QuantificationError> {
    cross_val_apply(prototype, data, y, folds, seed, |clf, sub| clf.predict(sub))
}
