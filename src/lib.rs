#[cfg(test)]
mod testing;

// Modules
pub mod bank;
pub mod calibration;
pub mod classifier;
pub mod data;
pub mod ensemble;
pub mod errors;
pub mod grid_search;
pub mod logistic;
pub mod parallel;
pub mod quantifier;
pub mod solver;
pub mod utils;
pub mod validation;

// Individual classes, and functions
pub use classifier::Classifier;
pub use data::Matrix;
pub use ensemble::{LabelledSample, QuantifierEnsemble};
pub use errors::QuantificationError;
pub use logistic::LogisticRegression;
pub use quantifier::config::{ConfigIO, Method, QuantifierConfig};
pub use quantifier::core::Quantifier;
