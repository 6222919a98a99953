//! Quantifier Configuration
//!
//! Defines the configuration structure of a [`crate::Quantifier`] and the
//! prevalence estimation methods it can prepare at fit time.
use crate::classifier::{ParamGrid, Params};
use crate::errors::QuantificationError;
use crate::grid_search::SearchConfig;
use crate::utils::items_to_strings;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Prevalence estimation methods.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Method {
    /// Classify & Count.
    CC,
    /// Adjusted Count, corrected with the cross-validated TPR and FPR.
    AC,
    /// Probabilistic Classify & Count.
    PCC,
    /// Probabilistic Adjusted Count.
    PAC,
    /// Hellinger distance mixture matching over score histograms.
    HDy,
    /// Friedman adjusted count, solved as a quadratic program.
    FriedmanAC,
    /// Multiclass adjusted count over the conditional decision matrix.
    MAC,
}

impl Method {
    /// Every method, in dispatch order.
    pub const ALL: [Method; 7] = [
        Method::CC,
        Method::AC,
        Method::PCC,
        Method::PAC,
        Method::HDy,
        Method::FriedmanAC,
        Method::MAC,
    ];

    /// Whether the method needs probability output from the estimators.
    pub fn is_probabilistic(&self) -> bool {
        matches!(self, Method::PCC | Method::PAC | Method::HDy | Method::FriedmanAC)
    }
}

impl FromStr for Method {
    type Err = QuantificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cc" => Ok(Method::CC),
            "ac" => Ok(Method::AC),
            "pcc" => Ok(Method::PCC),
            "pac" => Ok(Method::PAC),
            "hdy" => Ok(Method::HDy),
            "fac" => Ok(Method::FriedmanAC),
            "mac" => Ok(Method::MAC),
            _ => Err(QuantificationError::ParseString(
                s.to_string(),
                "Method".to_string(),
                items_to_strings(vec!["cc", "ac", "pcc", "pac", "hdy", "fac", "mac"]),
            )),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::CC => "cc",
            Method::AC => "ac",
            Method::PCC => "pcc",
            Method::PAC => "pac",
            Method::HDy => "hdy",
            Method::FriedmanAC => "fac",
            Method::MAC => "mac",
        };
        f.write_str(s)
    }
}

fn default_n_bins() -> Option<usize> {
    None
}
fn default_folds() -> usize {
    50
}
fn default_seed() -> u64 {
    0
}
fn default_num_threads() -> Option<usize> {
    None
}
fn default_methods() -> Option<Vec<Method>> {
    None
}
fn default_require_binary() -> bool {
    false
}

/// Configuration for the `Quantifier`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuantifierConfig {
    /// Number of histogram bins for HDy. HDy is prepared only when set.
    #[serde(default = "default_n_bins")]
    pub n_bins: Option<usize>,
    /// Requested cross-validation folds for calibration, capped by the smallest class.
    #[serde(default = "default_folds")]
    pub folds: usize,
    /// Seed for fold shuffling.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Number of threads for parallel tasks.
    #[serde(default = "default_num_threads")]
    pub num_threads: Option<usize>,
    /// Fixed hyperparameters applied to every estimator.
    #[serde(default)]
    pub estimator_params: Params,
    /// Hyperparameter grid. Empty means no grid search.
    #[serde(default)]
    pub estimator_grid: ParamGrid,
    /// Grid search settings.
    #[serde(default)]
    pub grid_search: SearchConfig,
    /// Methods to prepare at fit. `None` prepares CC, AC, PCC, PAC and, with `n_bins`, HDy.
    #[serde(default = "default_methods")]
    pub methods: Option<Vec<Method>>,
    /// Reject training labels that do not hold exactly two classes.
    #[serde(default = "default_require_binary")]
    pub require_binary: bool,
}

impl Default for QuantifierConfig {
    fn default() -> Self {
        QuantifierConfig {
            n_bins: default_n_bins(),
            folds: default_folds(),
            seed: default_seed(),
            num_threads: default_num_threads(),
            estimator_params: Params::new(),
            estimator_grid: ParamGrid::new(),
            grid_search: SearchConfig::default(),
            methods: default_methods(),
            require_binary: default_require_binary(),
        }
    }
}

impl QuantifierConfig {
    /// Methods prepared at fit, sorted and deduplicated.
    pub fn prepared_methods(&self) -> Vec<Method> {
        let mut methods = match &self.methods {
            Some(m) => m.clone(),
            None => {
                let mut m = vec![Method::CC, Method::AC, Method::PCC, Method::PAC];
                if self.n_bins.is_some() {
                    m.push(Method::HDy);
                }
                m
            }
        };
        methods.sort();
        methods.dedup();
        methods
    }

    /// Check the structural settings before any training.
    pub fn validate(&self) -> Result<(), QuantificationError> {
        if let Some(b) = self.n_bins {
            if b == 0 {
                return Err(QuantificationError::InvalidParameter(
                    "n_bins".to_string(),
                    "a positive number of bins".to_string(),
                    b.to_string(),
                ));
            }
        }
        if self.prepared_methods().contains(&Method::HDy) && self.n_bins.is_none() {
            return Err(QuantificationError::Configuration(
                "HDy requires the number of bins b to be set".to_string(),
            ));
        }
        if self.num_threads == Some(0) {
            return Err(QuantificationError::InvalidParameter(
                "num_threads".to_string(),
                "at least one thread".to_string(),
                "0".to_string(),
            ));
        }
        Ok(())
    }
}

/// IO
pub trait ConfigIO: Serialize + DeserializeOwned + Sized {
    /// Save a configuration as a json object to a file.
    ///
    /// * `path` - Path to save the configuration.
    fn save_config<P: AsRef<Path>>(&self, path: P) -> Result<(), QuantificationError> {
        fs::write(path, self.json_dump()?).map_err(|e| QuantificationError::UnableToWrite(e.to_string()))
    }

    /// Dump a configuration as a json object.
    fn json_dump(&self) -> Result<String, QuantificationError> {
        serde_json::to_string(self).map_err(|e| QuantificationError::UnableToWrite(e.to_string()))
    }

    /// Load a configuration from a json string.
    ///
    /// * `json_str` - String object, which can be deserialized from json.
    fn from_json(json_str: &str) -> Result<Self, QuantificationError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| QuantificationError::UnableToRead(e.to_string()))
    }

    /// Load a configuration from a path to a json object.
    ///
    /// * `path` - Path to load the configuration from.
    fn load_config<P: AsRef<Path>>(path: P) -> Result<Self, QuantificationError> {
        let json_str = fs::read_to_string(path).map_err(|e| QuantificationError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl ConfigIO for QuantifierConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = QuantifierConfig::default();
        assert_eq!(config.folds, 50);
        assert_eq!(config.n_bins, None);
        assert_eq!(
            config.prepared_methods(),
            vec![Method::CC, Method::AC, Method::PCC, Method::PAC]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_prepared_methods_with_bins() {
        let config = QuantifierConfig {
            n_bins: Some(10),
            ..Default::default()
        };
        assert!(config.prepared_methods().contains(&Method::HDy));
    }

    #[test]
    fn test_validate_hdy_without_bins() {
        let config = QuantifierConfig {
            methods: Some(vec![Method::HDy, Method::CC, Method::HDy]),
            ..Default::default()
        };
        assert_eq!(config.prepared_methods(), vec![Method::CC, Method::HDy]);
        match config.validate() {
            Err(QuantificationError::Configuration(msg)) => assert!(msg.contains(" b ")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("fac".parse::<Method>().unwrap(), Method::FriedmanAC);
        assert_eq!("HDy".parse::<Method>().unwrap(), Method::HDy);
        assert!(matches!(
            "em".parse::<Method>(),
            Err(QuantificationError::ParseString(..))
        ));
        for m in Method::ALL {
            assert_eq!(m.to_string().parse::<Method>().unwrap(), m);
        }
    }

    #[test]
    fn test_config_io_json() {
        let mut config = QuantifierConfig {
            n_bins: Some(8),
            methods: Some(vec![Method::CC, Method::FriedmanAC]),
            ..Default::default()
        };
        config.estimator_params.insert("C".to_string(), json!(0.5));
        config
            .estimator_grid
            .insert("max_iter".to_string(), vec![json!(50), json!(100)]);
        let json = config.json_dump().unwrap();
        let config2 = QuantifierConfig::from_json(&json).unwrap();
        assert_eq!(config, config2);
    }

    #[test]
    fn test_config_partial_json() {
        let config = QuantifierConfig::from_json(r#"{"n_bins": 4}"#).unwrap();
        assert_eq!(config.n_bins, Some(4));
        assert_eq!(config.folds, 50);
        assert!(config.estimator_grid.is_empty());
    }

    #[test]
    fn test_config_io_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("quantifier.json");
        let config = QuantifierConfig {
            folds: 5,
            seed: 42,
            ..Default::default()
        };
        config.save_config(&file_path).unwrap();
        let config2 = QuantifierConfig::load_config(&file_path).unwrap();
        assert_eq!(config, config2);
        assert!(matches!(
            QuantifierConfig::load_config(dir.path().join("missing.json")),
            Err(QuantificationError::UnableToRead(_))
        ));
    }
}
