//! Parallel
//!
//! Task-parallel map used to fit estimators and ensemble members concurrently.
//! Results keep the order of the inputs and every failure is reported together.
use crate::errors::{QuantificationError, TaskFailure};
use log::warn;
use rayon::prelude::*;
use rayon::ThreadPool;

/// Build a rayon pool with `num_threads` threads, all available cores when `None`.
pub fn build_pool(num_threads: Option<usize>) -> Result<ThreadPool, QuantificationError> {
    let num_threads = match num_threads {
        Some(n) => n,
        None => std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| QuantificationError::Configuration(format!("unable to build thread pool: {}", e)))
}

/// Run `task` over every input on the pool.
///
/// Returns the outputs in input order, or an `AggregatedTask` error carrying every
/// failed task when at least one of them failed.
pub fn parallel_map<I, O, F>(pool: &ThreadPool, inputs: Vec<I>, task: F) -> Result<Vec<O>, QuantificationError>
where
    I: Send,
    O: Send,
    F: Fn(usize, I) -> Result<O, QuantificationError> + Sync + Send,
{
    let total = inputs.len();
    let results: Vec<Result<O, QuantificationError>> = pool.install(|| {
        inputs
            .into_par_iter()
            .enumerate()
            .map(|(i, input)| task(i, input))
            .collect()
    });
    collect_results(total, results)
}

fn collect_results<O>(total: usize, results: Vec<Result<O, QuantificationError>>) -> Result<Vec<O>, QuantificationError> {
    let mut outputs = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for (task, result) in results.into_iter().enumerate() {
        match result {
            Ok(o) => outputs.push(o),
            Err(e) => {
                warn!("Task {} of {} failed: {}", task, total, e);
                failures.push(TaskFailure {
                    task,
                    message: e.to_string(),
                })
            }
        }
    }
    if failures.is_empty() {
        Ok(outputs)
    } else {
        Err(QuantificationError::AggregatedTask { total, failures })
    }
}
