//! Test utilities for graphbench-core.
//!
//! Provides a canned query executor so evaluator and pipeline tests run
//! without a graph store. Also used by the integration tests, so this module
//! is compiled into the library rather than gated on `cfg(test)`.

use crate::error::ExecutionError;
use crate::executor::QueryExecutor;
use crate::scoring::comparator::ResultSet;
use async_trait::async_trait;
use std::collections::HashMap;

/// A query executor backed by a fixed map of canned responses.
///
/// Queries resolve by exact string match; unknown queries fail with a
/// transport error, which exercises the same failure path a real endpoint
/// outage would.
#[derive(Debug, Default)]
pub struct StaticExecutor {
    responses: HashMap<String, Result<ResultSet, ExecutionError>>,
}

impl StaticExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a successful result set for a query.
    pub fn with_result(mut self, query: &str, result: ResultSet) -> Self {
        self.responses.insert(query.to_string(), Ok(result));
        self
    }

    /// Registers a successful item list for a query.
    pub fn with_items(self, query: &str, items: &[&str]) -> Self {
        let set = ResultSet::from_items(items.iter().copied());
        self.with_result(query, set)
    }

    /// Registers a boolean (ASK) result for a query.
    pub fn with_boolean(self, query: &str, value: bool) -> Self {
        self.with_result(query, ResultSet::from_bool(value))
    }

    /// Registers a failure for a query.
    pub fn with_error(mut self, query: &str, error: ExecutionError) -> Self {
        self.responses.insert(query.to_string(), Err(error));
        self
    }
}

#[async_trait]
impl QueryExecutor for StaticExecutor {
    async fn execute(&self, query: &str) -> Result<ResultSet, ExecutionError> {
        match self.responses.get(query) {
            Some(response) => response.clone(),
            None => Err(ExecutionError::Transport(format!(
                "no canned response for query: {}",
                query
            ))),
        }
    }
}
