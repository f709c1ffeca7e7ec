//! Error types for graphbench-core.
//!
//! Per-case execution errors are recovered by the evaluator (a failed case is
//! scored as a query-level false negative and the batch continues). Dataset
//! and report errors are fatal: they occur before any accumulation begins or
//! after the run has finished.

use thiserror::Error;

/// Errors raised while executing a query against the graph store.
///
/// The scoring core treats every variant uniformly: the case that triggered
/// it transitions to the failed state and the batch moves on.
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    /// The query did not complete within the configured deadline
    #[error("query timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
    /// The request could not be sent or the connection dropped
    #[error("request failed: {0}")]
    Transport(String),
    /// The endpoint answered with a non-success status
    #[error("endpoint returned status {status}: {message}")]
    Endpoint { status: u16, message: String },
    /// The endpoint answered, but not with a parseable results document
    #[error("invalid query response: {0}")]
    InvalidResponse(String),
    /// The endpoint URL could not be parsed
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
}

/// Errors raised while loading a dataset. All of these are fatal.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// IO error reading the dataset file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The dataset file does not exist
    #[error("missing dataset file: {0}")]
    MissingFile(String),
    /// The file parsed but does not match the expected record shape
    #[error("invalid dataset format: {0}")]
    InvalidFormat(String),
}

/// Errors raised while serializing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// IO error writing the report
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV serialization failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
