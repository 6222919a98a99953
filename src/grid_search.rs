//! Grid Search
//!
//! Exhaustive search over a parameter grid, scoring every candidate by cross-validation.
use crate::classifier::{apply_params, Classifier, ParamGrid, Params};
use crate::data::Matrix;
use crate::errors::QuantificationError;
use crate::utils::is_comparison_better;
use crate::validation::{binary_labels, cross_val_score, effective_folds, Scoring};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

fn default_search_folds() -> usize {
    3
}

/// Configuration of the internal grid search.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Number of cross-validation folds per candidate.
    #[serde(default = "default_search_folds")]
    pub folds: usize,
    /// Score used to rank candidates.
    #[serde(default)]
    pub scoring: Scoring,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            folds: default_search_folds(),
            scoring: Scoring::default(),
        }
    }
}

/// Every combination of the grid values, in lexicographic order of parameter names.
pub fn expand_grid(grid: &ParamGrid) -> Vec<Params> {
    let mut candidates = vec![Params::new()];
    for (name, values) in grid {
        let mut next = Vec::with_capacity(candidates.len() * values.len());
        for c in &candidates {
            for v in values {
                let mut p = c.clone();
                p.insert(name.clone(), v.clone());
                next.push(p);
            }
        }
        candidates = next;
    }
    candidates
}

/// Result of a grid search: the refitted best estimator.
pub struct GridSearchResult<C> {
    pub best_estimator: C,
    pub best_params: Params,
    pub best_score: f64,
}

/// Select the parameters of `grid` with the best mean cross-validated score on
/// `(data, y)` and refit the prototype with them on the full data.
pub fn grid_search<C: Classifier + Clone>(
    prototype: &C,
    grid: &ParamGrid,
    config: &SearchConfig,
    data: &Matrix<f64>,
    y: &[f64],
    seed: u64,
) -> Result<GridSearchResult<C>, QuantificationError> {
    let candidates = expand_grid(grid);
    let folds = effective_folds(config.folds, &binary_labels(y)).max(2);

    let scored = candidates
        .into_par_iter()
        .map(|params| {
            let mut clf = prototype.clone();
            apply_params(&mut clf, &params)?;
            let scores = cross_val_score(&clf, data, y, folds, config.scoring, seed)?;
            let mean = scores.iter().sum::<f64>() / scores.len().max(1) as f64;
            debug!("Grid candidate {:?} scored {:.4}", params, mean);
            Ok((params, mean))
        })
        .collect::<Result<Vec<_>, QuantificationError>>()?;

    let maximize = config.scoring.maximize();
    let mut best: Option<(Params, f64)> = None;
    for (params, score) in scored {
        let better = match &best {
            None => true,
            Some((_, b)) => is_comparison_better(*b, score, maximize),
        };
        if better {
            best = Some((params, score));
        }
    }
    let (best_params, best_score) =
        best.ok_or_else(|| QuantificationError::Configuration("estimator grid has no candidates".to_string()))?;

    let mut best_estimator = prototype.clone();
    apply_params(&mut best_estimator, &best_params)?;
    best_estimator.fit(data, y)?;
    Ok(GridSearchResult {
        best_estimator,
        best_params,
        best_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CrispStub;
    use serde_json::json;

    #[test]
    fn test_expand_grid() {
        let mut grid = ParamGrid::new();
        grid.insert("a".to_string(), vec![json!(1), json!(2)]);
        grid.insert("b".to_string(), vec![json!("x"), json!("y"), json!("z")]);
        let c = expand_grid(&grid);
        assert_eq!(c.len(), 6);
        assert_eq!(c[0]["a"], json!(1));
        assert_eq!(c[0]["b"], json!("x"));
        assert_eq!(c[5]["a"], json!(2));
        assert_eq!(c[5]["b"], json!("z"));
    }

    #[test]
    fn test_grid_search_picks_best_threshold() {
        let x: Vec<f64> = (0..20).map(|i| i as f64 / 20.0).collect();
        let y: Vec<f64> = (0..20).map(|i| if i >= 10 { 1.0 } else { 0.0 }).collect();
        let m = Matrix::new(&x, 20, 1);
        let mut grid = ParamGrid::new();
        grid.insert("threshold".to_string(), vec![json!(0.1), json!(0.5), json!(0.9)]);

        let res = grid_search(&CrispStub::new(0.0), &grid, &SearchConfig::default(), &m, &y, 0).unwrap();
        assert_eq!(res.best_params["threshold"], json!(0.5));
        assert_eq!(res.best_estimator.threshold, 0.5);
        assert_eq!(res.best_score, 1.0);
    }

    #[test]
    fn test_grid_search_unknown_parameter() {
        let x = vec![0.0, 0.2, 0.8, 1.0];
        let y = vec![0.0, 0.0, 1.0, 1.0];
        let m = Matrix::new(&x, 4, 1);
        let mut grid = ParamGrid::new();
        grid.insert("depth".to_string(), vec![json!(3)]);
        let res = grid_search(&CrispStub::new(0.5), &grid, &SearchConfig::default(), &m, &y, 0);
        assert!(matches!(res, Err(QuantificationError::InvalidParameter(..))));
    }
}
