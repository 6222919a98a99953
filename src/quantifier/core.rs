use crate::bank::EstimatorBank;
use crate::calibration::conditional::ConditionalTable;
use crate::calibration::distribution::DistributionTable;
use crate::calibration::friedman::FriedmanTable;
use crate::calibration::{calibration_folds, out_of_fold_scores};
use crate::calibration::performance::{calibrate_performance, PerformanceTable};
use crate::classifier::Classifier;
use crate::data::{check_x_y, unique_labels, Matrix};
use crate::errors::QuantificationError;
use crate::logistic::LogisticRegression;
use crate::parallel::build_pool;
use crate::quantifier::config::{Method, QuantifierConfig};
use crate::solver::qp::{InteriorPoint, QuadraticProgram};
use log::{info, warn};
use std::sync::Arc;
use std::time::Instant;

/// Everything learned at fit. Replaced as a whole on refit, never mutated by `predict`.
#[derive(Clone)]
pub(crate) struct FittedState<C> {
    pub(crate) bank: EstimatorBank<C>,
    pub(crate) performance: PerformanceTable,
    pub(crate) distribution: Option<DistributionTable>,
    pub(crate) friedman: Option<FriedmanTable>,
    pub(crate) conditional: Option<ConditionalTable>,
    pub(crate) prepared: Vec<Method>,
    pub(crate) folds: usize,
    pub(crate) n_features: usize,
}

/// Classify-and-count quantifier over a one-vs-all bank of binary classifiers.
#[derive(Clone)]
pub struct Quantifier<C> {
    pub cfg: QuantifierConfig,
    pub(crate) estimator: Option<C>,
    pub(crate) solver: Arc<dyn QuadraticProgram>,
    pub(crate) state: Option<FittedState<C>>,
}

impl Default for Quantifier<LogisticRegression> {
    fn default() -> Self {
        Quantifier {
            cfg: QuantifierConfig::default(),
            estimator: Some(LogisticRegression::default()),
            solver: Arc::new(InteriorPoint::default()),
            state: None,
        }
    }
}

impl<C: Classifier + Clone> Quantifier<C> {
    /// Quantifier object
    ///
    /// * `estimator` - Unfitted binary classifier cloned for every class. `None` fails at fit.
    /// * `cfg` - Calibration, parallelism and method settings.
    pub fn new(estimator: Option<C>, cfg: QuantifierConfig) -> Result<Self, QuantificationError> {
        cfg.validate()?;
        Ok(Quantifier {
            cfg,
            estimator,
            solver: Arc::new(InteriorPoint::default()),
            state: None,
        })
    }

    /// Quantifier preparing a single method.
    ///
    /// * `estimator` - Unfitted binary classifier.
    /// * `method` - The method to prepare.
    /// * `n_bins` - Number of histogram bins, required for HDy.
    pub fn for_method(estimator: C, method: Method, n_bins: Option<usize>) -> Result<Self, QuantificationError> {
        let cfg = QuantifierConfig {
            n_bins,
            methods: Some(vec![method]),
            ..Default::default()
        };
        Self::new(Some(estimator), cfg)
    }

    /// Fit the quantifier on a provided dataset.
    ///
    /// Trains the estimator bank, calibrates every estimator and prepares the tables of the
    /// configured methods. Any previous fit is discarded.
    ///
    /// * `data` - Training features.
    /// * `y` - Class labels, at least two distinct values.
    pub fn fit(&mut self, data: &Matrix<f64>, y: &[usize]) -> Result<(), QuantificationError> {
        let start = Instant::now();
        let estimator = self
            .estimator
            .as_ref()
            .ok_or_else(|| QuantificationError::Configuration("estimator cannot be None".to_string()))?;
        check_x_y(data, y.len())?;
        self.cfg.validate()?;

        let classes = unique_labels(y);
        if classes.len() < 2 {
            return Err(QuantificationError::DataShape(format!(
                "at least two classes are required, found {:?}",
                classes
            )));
        }
        if self.cfg.require_binary && classes.len() != 2 {
            return Err(QuantificationError::DataShape(format!(
                "binary labels are required, found {} classes",
                classes.len()
            )));
        }
        // Labels are members of `classes` by construction.
        let class_index: Vec<usize> = y
            .iter()
            .map(|l| classes.binary_search(l).unwrap_or_default())
            .collect();

        let folds = calibration_folds(self.cfg.folds, y);
        if folds <= 1 {
            warn!("Only {} calibration fold available, estimating rates in sample", folds);
        }

        let pool = build_pool(self.cfg.num_threads)?;
        let bank = EstimatorBank::fit(estimator, &self.cfg, data, y, &classes, &pool)?;
        let performance = calibrate_performance(&bank, data, y, folds, self.cfg.seed, &pool)?;

        let prepared = self.cfg.prepared_methods();
        let wants = |m: Method| prepared.contains(&m);
        let proba = bank.supports_proba();
        if !proba && (wants(Method::HDy) || wants(Method::FriedmanAC)) {
            warn!(
                "{} has no probability output, HDy and Friedman tables are not prepared",
                estimator.name()
            );
        }

        let needs_scores = (proba && (wants(Method::HDy) || wants(Method::FriedmanAC))) || wants(Method::MAC);
        let scores = if needs_scores {
            out_of_fold_scores(&bank, data, y, folds, self.cfg.seed, proba, &pool)?
        } else {
            Vec::new()
        };

        let n_classes = classes.len();
        let distribution = match self.cfg.n_bins {
            Some(b) if proba && wants(Method::HDy) => Some(DistributionTable::fit(&scores, &class_index, n_classes, b)?),
            _ => None,
        };
        let friedman = if proba && wants(Method::FriedmanAC) {
            Some(FriedmanTable::fit(&scores, &class_index, n_classes)?)
        } else {
            None
        };
        let conditional = if wants(Method::MAC) {
            Some(ConditionalTable::fit(&scores, &class_index, n_classes)?)
        } else {
            None
        };

        info!(
            "Fitted quantifier on {} samples and {} classes with {} calibration folds in {:.2?}, prepared methods {:?}",
            data.rows,
            n_classes,
            folds,
            start.elapsed(),
            prepared
        );
        self.state = Some(FittedState {
            bank,
            performance,
            distribution,
            friedman,
            conditional,
            prepared,
            folds,
            n_features: data.cols,
        });
        Ok(())
    }

    /// Classes seen at fit, empty before.
    pub fn classes(&self) -> &[usize] {
        self.state.as_ref().map(|s| s.bank.classes()).unwrap_or(&[])
    }

    /// Whether `fit` has completed.
    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Methods prepared by the last fit.
    pub fn prepared_methods(&self) -> &[Method] {
        self.state.as_ref().map(|s| s.prepared.as_slice()).unwrap_or(&[])
    }

    /// Folds used to calibrate the last fit, the configured amount capped by the smallest class.
    pub fn calibration_folds(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.folds)
    }

    /// Calibrated performance of every estimator, keyed by class.
    pub fn performance(&self) -> Option<&PerformanceTable> {
        self.state.as_ref().map(|s| &s.performance)
    }

    /// Fitted estimator of a class. Binary problems only hold the positive class.
    pub fn estimator_for(&self, class: usize) -> Option<&C> {
        self.state.as_ref().and_then(|s| s.bank.get(class))
    }
}
