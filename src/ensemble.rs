//! Ensemble
//!
//! A quantifier per labelled sample, fitted concurrently. The prevalence of a test sample
//! is the mean of the members' estimates.
use crate::classifier::Classifier;
use crate::data::Matrix;
use crate::errors::QuantificationError;
use crate::parallel::{build_pool, parallel_map};
use crate::quantifier::config::{Method, QuantifierConfig};
use crate::quantifier::core::Quantifier;
use log::info;

/// A labelled training sample.
#[derive(Debug, Clone, Copy)]
pub struct LabelledSample<'a> {
    pub data: Matrix<'a, f64>,
    pub y: &'a [usize],
}

impl<'a> LabelledSample<'a> {
    pub fn new(data: Matrix<'a, f64>, y: &'a [usize]) -> Self {
        LabelledSample { data, y }
    }
}

/// Quantifiers fitted on separate samples and averaged at prediction.
#[derive(Clone)]
pub struct QuantifierEnsemble<C> {
    pub cfg: QuantifierConfig,
    estimator: Option<C>,
    members: Vec<Quantifier<C>>,
}

impl<C: Classifier + Clone> QuantifierEnsemble<C> {
    /// * `estimator` - Unfitted binary classifier shared by every member.
    /// * `cfg` - Configuration of every member. `num_threads` sizes the ensemble pool,
    ///   members train single threaded.
    pub fn new(estimator: Option<C>, cfg: QuantifierConfig) -> Result<Self, QuantificationError> {
        cfg.validate()?;
        Ok(QuantifierEnsemble {
            cfg,
            estimator,
            members: Vec::new(),
        })
    }

    /// Fit one member per sample in parallel. Every sample must hold the same classes.
    pub fn fit(&mut self, samples: &[LabelledSample]) -> Result<(), QuantificationError> {
        if samples.is_empty() {
            return Err(QuantificationError::DataShape("no samples to fit".to_string()));
        }
        let member_cfg = QuantifierConfig {
            num_threads: Some(1),
            ..self.cfg.clone()
        };
        let pool = build_pool(self.cfg.num_threads)?;
        let members = parallel_map(&pool, samples.iter().collect(), |_, sample| {
            let mut q = Quantifier::new(self.estimator.clone(), member_cfg.clone())?;
            q.fit(&sample.data, sample.y)?;
            Ok(q)
        })?;

        let classes = members[0].classes().to_vec();
        if let Some((i, m)) = members.iter().enumerate().find(|(_, m)| m.classes() != classes.as_slice()) {
            return Err(QuantificationError::DataShape(format!(
                "sample {} holds classes {:?}, sample 0 holds {:?}",
                i,
                m.classes(),
                classes
            )));
        }
        info!("Fitted ensemble of {} quantifiers over classes {:?}", members.len(), classes);
        self.members = members;
        Ok(())
    }

    pub fn members(&self) -> &[Quantifier<C>] {
        &self.members
    }

    /// Classes shared by every member, empty before fit.
    pub fn classes(&self) -> &[usize] {
        self.members.first().map(|m| m.classes()).unwrap_or(&[])
    }

    /// Mean prevalence estimate of the members.
    pub fn predict(&self, data: &Matrix<f64>, method: Method) -> Result<Vec<f64>, QuantificationError> {
        if self.members.is_empty() {
            return Err(QuantificationError::Configuration(
                "ensemble is not fitted, call fit first".to_string(),
            ));
        }
        let mut mean = vec![0.0; self.classes().len()];
        for m in &self.members {
            for (acc, p) in mean.iter_mut().zip(m.predict(data, method)?) {
                *acc += p;
            }
        }
        let n = self.members.len() as f64;
        mean.iter_mut().for_each(|v| *v /= n);
        Ok(mean)
    }

    /// Estimate several samples in parallel, preserving their order.
    pub fn predict_many(&self, samples: &[Matrix<f64>], method: Method) -> Result<Vec<Vec<f64>>, QuantificationError> {
        let pool = build_pool(self.cfg.num_threads)?;
        parallel_map(&pool, samples.iter().collect(), |_, data| self.predict(data, method))
    }
}
