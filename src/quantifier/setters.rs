use crate::classifier::{ParamGrid, Params};
use crate::grid_search::SearchConfig;
use crate::quantifier::config::Method;
use crate::quantifier::core::Quantifier;
use crate::solver::qp::QuadraticProgram;
use std::sync::Arc;

impl<C> Quantifier<C> {
    // Set methods for parameters

    /// Set the estimator on the quantifier.
    /// * `estimator` - Unfitted binary classifier cloned for every class.
    pub fn set_estimator(mut self, estimator: Option<C>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Set the number of histogram bins used by HDy.
    /// * `n_bins` - Number of equal-width bins over `[0, 1]`.
    pub fn set_n_bins(mut self, n_bins: Option<usize>) -> Self {
        self.cfg.n_bins = n_bins;
        self
    }

    /// Set the number of calibration folds.
    /// * `folds` - Requested folds, capped at fit by the smallest class.
    pub fn set_folds(mut self, folds: usize) -> Self {
        self.cfg.folds = folds;
        self
    }

    /// Set the seed used to shuffle folds.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.cfg.seed = seed;
        self
    }

    /// Set the number of threads on the quantifier.
    /// * `num_threads` - Set the number of threads to be used during training.
    pub fn set_num_threads(mut self, num_threads: Option<usize>) -> Self {
        self.cfg.num_threads = num_threads;
        self
    }

    /// Set fixed hyperparameters applied to every estimator.
    pub fn set_estimator_params(mut self, estimator_params: Params) -> Self {
        self.cfg.estimator_params = estimator_params;
        self
    }

    /// Set the hyperparameter grid searched for every estimator.
    /// * `estimator_grid` - Candidate values per parameter. An empty grid disables the search.
    pub fn set_estimator_grid(mut self, estimator_grid: ParamGrid) -> Self {
        self.cfg.estimator_grid = estimator_grid;
        self
    }

    pub fn set_grid_search(mut self, grid_search: SearchConfig) -> Self {
        self.cfg.grid_search = grid_search;
        self
    }

    /// Set the methods prepared at fit.
    /// * `methods` - `None` prepares CC, AC, PCC, PAC and HDy when `n_bins` is set.
    pub fn set_methods(mut self, methods: Option<Vec<Method>>) -> Self {
        self.cfg.methods = methods;
        self
    }

    pub fn set_require_binary(mut self, require_binary: bool) -> Self {
        self.cfg.require_binary = require_binary;
        self
    }

    /// Set the quadratic program solver of the Friedman correction.
    pub fn set_solver(mut self, solver: Arc<dyn QuadraticProgram>) -> Self {
        self.solver = solver;
        self
    }
}
