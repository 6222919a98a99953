//! Prediction Methods
//!
//! Method dispatch of the quantifier. Prediction takes `&self` and never touches the
//! fitted state, so a fitted quantifier can be shared across threads.
use crate::classifier::Classifier;
use crate::data::Matrix;
use crate::errors::QuantificationError;
use crate::parallel::{build_pool, parallel_map};
use crate::quantifier::config::Method;
use crate::quantifier::core::{FittedState, Quantifier};
use crate::quantifier::strategies::*;
use crate::utils::fmt_vec_output;
use log::debug;

fn missing_table(method: Method) -> QuantificationError {
    QuantificationError::Configuration(format!("method {} was not prepared at fit", method))
}

impl<C: Classifier + Clone> Quantifier<C> {
    fn fitted_state(&self) -> Result<&FittedState<C>, QuantificationError> {
        self.state
            .as_ref()
            .ok_or_else(|| QuantificationError::Configuration("quantifier is not fitted, call fit first".to_string()))
    }

    /// Estimate the class prevalence of a sample.
    ///
    /// Returns one proportion per class, in ascending class order.
    ///
    /// * `data` - Unlabelled sample, with the training number of features.
    /// * `method` - The strategy to use. It must have been prepared at fit.
    pub fn predict(&self, data: &Matrix<f64>, method: Method) -> Result<Vec<f64>, QuantificationError> {
        let state = self.fitted_state()?;
        data.validate()?;
        if data.rows == 0 {
            return Err(QuantificationError::DataShape("sample is empty".to_string()));
        }
        if data.cols != state.n_features {
            return Err(QuantificationError::DataShape(format!(
                "expected {} features, found {}",
                state.n_features, data.cols
            )));
        }
        if !state.prepared.contains(&method) {
            return Err(match method {
                Method::HDy if self.cfg.n_bins.is_none() => QuantificationError::Configuration(
                    "HDy requires the number of bins b, set n_bins before fit".to_string(),
                ),
                _ => missing_table(method),
            });
        }
        if method.is_probabilistic() {
            if let Some(name) = state.bank.crisp_estimator_name() {
                return Err(QuantificationError::UnsupportedEstimator(name));
            }
        }

        let bank = &state.bank;
        let prevalence = match method {
            Method::CC => classify_and_count(bank, data),
            Method::AC => adjusted_count(bank, &state.performance, data),
            Method::PCC => probabilistic_classify_and_count(bank, data),
            Method::PAC => probabilistic_adjusted_count(bank, &state.performance, data),
            Method::HDy => {
                let table = state.distribution.as_ref().ok_or_else(|| missing_table(method))?;
                hellinger_distance_y(bank, table, data)
            }
            Method::FriedmanAC => {
                let table = state.friedman.as_ref().ok_or_else(|| missing_table(method))?;
                friedman_adjusted_count(bank, table, self.solver.as_ref(), data)
            }
            Method::MAC => {
                let table = state.conditional.as_ref().ok_or_else(|| missing_table(method))?;
                multiclass_adjusted_count(bank, table, data)
            }
        }?;
        debug!("{} prevalence over {} rows: [{}]", method, data.rows, fmt_vec_output(&prevalence));
        Ok(prevalence)
    }

    /// Estimate the prevalence of several samples in parallel, preserving their order.
    pub fn predict_many(&self, samples: &[Matrix<f64>], method: Method) -> Result<Vec<Vec<f64>>, QuantificationError> {
        let pool = build_pool(self.cfg.num_threads)?;
        parallel_map(&pool, samples.iter().collect(), |_, data| self.predict(data, method))
    }
}
