//! Prevalence Strategies
//!
//! One handler per method. Each is a pure function of the estimator bank, the table it
//! was calibrated with and the test data.
use crate::bank::EstimatorBank;
use crate::calibration::conditional::{decision_frequencies, decisions, ConditionalTable};
use crate::calibration::distribution::DistributionTable;
use crate::calibration::friedman::FriedmanTable;
use crate::calibration::performance::PerformanceTable;
use crate::classifier::{mean_probability, positive_rate, Classifier};
use crate::data::Matrix;
use crate::errors::QuantificationError;
use crate::solver::hellinger::HellingerSolver;
use crate::solver::linalg::{is_pd, nearest_pd};
use crate::solver::qp::{simplex_constraints, QuadraticProgram};
use crate::utils::{adjust_rate, expand_binary, renormalize};
use log::{debug, warn};

fn finish(raw: Vec<f64>) -> Vec<f64> {
    renormalize(expand_binary(raw))
}

/// Classify & Count: fraction of positive hard predictions per estimator.
pub fn classify_and_count<C: Classifier>(
    bank: &EstimatorBank<C>,
    data: &Matrix<f64>,
) -> Result<Vec<f64>, QuantificationError> {
    let freq = bank.predict_all(data)?.iter().map(|p| positive_rate(p)).collect();
    Ok(finish(freq))
}

/// Adjusted Count: `(freq - fpr) / (tpr - fpr)` per estimator, clipped to `[0, 1]`.
pub fn adjusted_count<C: Classifier>(
    bank: &EstimatorBank<C>,
    performance: &PerformanceTable,
    data: &Matrix<f64>,
) -> Result<Vec<f64>, QuantificationError> {
    let mut adjusted = Vec::with_capacity(bank.len());
    for (class, clf) in bank.iter() {
        let perf = performance.get(class).ok_or_else(|| {
            QuantificationError::Configuration(format!("no calibrated rates for class {}", class))
        })?;
        if perf.tpr == perf.fpr {
            warn!("Class {}: tpr equals fpr ({:.4}), the adjusted count is undefined", class, perf.tpr);
        }
        let freq = positive_rate(&clf.predict(data)?);
        adjusted.push(adjust_rate(freq, perf.tpr, perf.fpr));
    }
    Ok(finish(adjusted))
}

/// Probabilistic Classify & Count: mean positive probability per estimator.
pub fn probabilistic_classify_and_count<C: Classifier>(
    bank: &EstimatorBank<C>,
    data: &Matrix<f64>,
) -> Result<Vec<f64>, QuantificationError> {
    let means = bank.predict_proba_all(data)?.iter().map(|p| mean_probability(p)).collect();
    Ok(finish(means))
}

/// Probabilistic Adjusted Count: `(p - fp_pa) / (tp_pa - fp_pa)` per estimator, clipped to `[0, 1]`.
pub fn probabilistic_adjusted_count<C: Classifier>(
    bank: &EstimatorBank<C>,
    performance: &PerformanceTable,
    data: &Matrix<f64>,
) -> Result<Vec<f64>, QuantificationError> {
    let mut adjusted = Vec::with_capacity(bank.len());
    for (class, clf) in bank.iter() {
        let perf = performance.get(class);
        let (tp_pa, fp_pa) = match perf.and_then(|p| p.tp_pa.zip(p.fp_pa)) {
            Some(rates) => rates,
            None => return Err(QuantificationError::UnsupportedEstimator(clf.name())),
        };
        if tp_pa == fp_pa {
            warn!("Class {}: tp_pa equals fp_pa ({:.4}), the adjusted count is undefined", class, tp_pa);
        }
        let p = mean_probability(&clf.predict_proba(data)?);
        adjusted.push(adjust_rate(p, tp_pa, fp_pa));
    }
    Ok(finish(adjusted))
}

/// HDy: mixture of the class rows of the training table closest to the test histograms
/// in Hellinger distance.
pub fn hellinger_distance_y<C: Classifier>(
    bank: &EstimatorBank<C>,
    table: &DistributionTable,
    data: &Matrix<f64>,
) -> Result<Vec<f64>, QuantificationError> {
    let test = table.test_row(&bank.predict_proba_all(data)?)?;
    HellingerSolver::default().solve(&table.rows, &test)
}

/// Friedman adjusted count: minimize `0.5 x'Gx - a'x` over the simplex with `G = V'V`
/// and `a = V'U`. Round-off below zero in the solution is clipped.
pub fn friedman_adjusted_count<C: Classifier>(
    bank: &EstimatorBank<C>,
    table: &FriedmanTable,
    solver: &dyn QuadraticProgram,
    data: &Matrix<f64>,
) -> Result<Vec<f64>, QuantificationError> {
    let u = table.test_indicators(&bank.predict_proba_all(data)?);
    let vt = table.v.transpose();
    let mut g = &vt * &table.v;
    if !is_pd(&g) {
        debug!("V'V is not positive definite, using its nearest positive definite matrix");
        g = nearest_pd(&g);
    }
    let a = &vt * u;
    let (c, b, meq) = simplex_constraints(table.prevalence.len());
    let x = solver.solve(&g, &a, &c, &b, meq)?;
    Ok(renormalize(x.iter().map(|v| v.max(0.0)).collect()))
}

/// Multiclass adjusted count: decision frequencies corrected by the conditional matrix.
pub fn multiclass_adjusted_count<C: Classifier>(
    bank: &EstimatorBank<C>,
    table: &ConditionalTable,
    data: &Matrix<f64>,
) -> Result<Vec<f64>, QuantificationError> {
    let n_classes = bank.classes().len();
    let freq = decision_frequencies(&decisions(&bank.scores_all(data)?, n_classes), n_classes);
    Ok(renormalize(table.adjust(&freq)?))
}
