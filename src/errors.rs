//! Errors
//!
//! Custom error types used throughout the `quantification` crate.
use std::fmt;
use thiserror::Error;

/// A single failed task of a parallel map.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFailure {
    /// Position of the task in the submitted inputs.
    pub task: usize,
    /// Rendered error of the task.
    pub message: String,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task {}: {}", self.task, self.message)
    }
}

fn summarize(failures: &[TaskFailure]) -> String {
    failures.iter().map(|f| f.to_string()).collect::<Vec<_>>().join("; ")
}

/// Errors that can occur while fitting or using a quantifier.
#[derive(Debug, Error)]
pub enum QuantificationError {
    /// Structural misconfiguration: missing classifier, missing number of bins, method not prepared.
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    /// A probabilistic method was requested against a classifier without probability output.
    #[error("Probabilistic methods like PCC or PAC cannot be used with hard (crisp) classifiers like {0}.")]
    UnsupportedEstimator(String),
    /// Inconsistent input dimensions or labels.
    #[error("Invalid data shape: {0}")]
    DataShape(String),
    /// The quadratic program is infeasible or numerically degenerate.
    #[error("Unable to solve quadratic program: {0}")]
    Solver(String),
    /// The underlying classifier failed to fit.
    #[error("Estimator {0} failed: {1}")]
    Estimator(String, String),
    /// One or more parallel tasks failed.
    #[error("{} of {} parallel tasks failed: {}", .failures.len(), .total, summarize(.failures))]
    AggregatedTask { total: usize, failures: Vec<TaskFailure> },
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Unable to write config to file.
    #[error("Unable to write to file: {0}")]
    UnableToWrite(String),
    /// Unable to read config from file.
    #[error("Unable to read from file {0}")]
    UnableToRead(String),
}
