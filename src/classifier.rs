//! Classifier
//!
//! The binary classifier capability consumed by the quantifiers. Every estimator of the
//! bank is a clone of a prototype implementing [`Classifier`], trained on binarized
//! (`0.0` / `1.0`) targets.
use crate::data::Matrix;
use crate::errors::QuantificationError;
use serde_json::Value;
use std::collections::BTreeMap;

/// A single hyperparameter value.
pub type ParamValue = Value;
/// Fixed hyperparameters, keyed by name.
pub type Params = BTreeMap<String, ParamValue>;
/// Candidate values per hyperparameter for grid search.
pub type ParamGrid = BTreeMap<String, Vec<ParamValue>>;

/// Binary classifier capability.
pub trait Classifier: Send + Sync {
    /// Name used in error messages and logs.
    fn name(&self) -> String;

    /// Fit the classifier.
    ///
    /// * `data` - Feature matrix.
    /// * `y` - Binary targets, `0.0` or `1.0`.
    fn fit(&mut self, data: &Matrix<f64>, y: &[f64]) -> Result<(), QuantificationError>;

    /// Hard predictions, `0.0` or `1.0` per row.
    fn predict(&self, data: &Matrix<f64>) -> Result<Vec<f64>, QuantificationError>;

    /// Probability of the positive class per row.
    fn predict_proba(&self, _data: &Matrix<f64>) -> Result<Vec<f64>, QuantificationError> {
        Err(QuantificationError::UnsupportedEstimator(self.name()))
    }

    /// Whether `predict_proba` is available.
    fn supports_proba(&self) -> bool {
        false
    }

    /// Set a hyperparameter by name.
    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), QuantificationError> {
        Err(QuantificationError::InvalidParameter(
            name.to_string(),
            format!("a parameter known to {}", self.name()),
            value.to_string(),
        ))
    }
}

/// Apply every parameter of `params` to the classifier.
pub fn apply_params<C: Classifier>(clf: &mut C, params: &Params) -> Result<(), QuantificationError> {
    for (name, value) in params {
        clf.set_param(name, value)?;
    }
    Ok(())
}

/// Read a float out of a parameter value.
pub fn param_as_f64(name: &str, value: &ParamValue) -> Result<f64, QuantificationError> {
    value.as_f64().ok_or_else(|| {
        QuantificationError::InvalidParameter(name.to_string(), "a number".to_string(), value.to_string())
    })
}

/// Read a non-negative integer out of a parameter value.
pub fn param_as_usize(name: &str, value: &ParamValue) -> Result<usize, QuantificationError> {
    value.as_u64().map(|v| v as usize).ok_or_else(|| {
        QuantificationError::InvalidParameter(name.to_string(), "a non-negative integer".to_string(), value.to_string())
    })
}

/// Read a boolean out of a parameter value.
pub fn param_as_bool(name: &str, value: &ParamValue) -> Result<bool, QuantificationError> {
    value.as_bool().ok_or_else(|| {
        QuantificationError::InvalidParameter(name.to_string(), "a boolean".to_string(), value.to_string())
    })
}

/// Fraction of hard predictions equal to one.
pub fn positive_rate(predictions: &[f64]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    predictions.iter().filter(|&&p| p > 0.5).count() as f64 / predictions.len() as f64
}

/// Mean of the positive-class probabilities.
pub fn mean_probability(probabilities: &[f64]) -> f64 {
    if probabilities.is_empty() {
        return 0.0;
    }
    probabilities.iter().sum::<f64>() / probabilities.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CrispStub;
    use serde_json::json;

    #[test]
    fn test_default_proba_is_unsupported() {
        let clf = CrispStub::new(0.5);
        let v = vec![0.1, 0.9];
        let m = Matrix::new(&v, 2, 1);
        assert!(!clf.supports_proba());
        assert!(matches!(
            clf.predict_proba(&m),
            Err(QuantificationError::UnsupportedEstimator(_))
        ));
    }

    #[test]
    fn test_param_readers() {
        assert_eq!(param_as_f64("C", &json!(0.5)).unwrap(), 0.5);
        assert_eq!(param_as_usize("max_iter", &json!(10)).unwrap(), 10);
        assert!(param_as_bool("fit_intercept", &json!(true)).unwrap());
        assert!(matches!(
            param_as_usize("max_iter", &json!(-1)),
            Err(QuantificationError::InvalidParameter(..))
        ));
    }

    #[test]
    fn test_rates() {
        assert_eq!(positive_rate(&[1.0, 0.0, 1.0, 1.0]), 0.75);
        assert_eq!(positive_rate(&[]), 0.0);
        assert!((mean_probability(&[0.2, 0.4]) - 0.3).abs() < 1e-12);
    }
}
