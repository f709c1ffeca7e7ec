//! # Graphbench Core
//!
//! Library for scoring natural-language-to-SPARQL generation models against a
//! knowledge graph.
//!
//! Generated queries (or pre-supplied generated answers) are compared to gold
//! queries/answers at two granularities: query level, where a test case passes
//! only if its entire result set matches exactly, and item level, where each
//! result row is scored individually. Counts aggregate per question type and
//! overall, and derive standard classification metrics for tabular reports.
//!
//! ## Modules
//!
//! - [`dataset`] - Test case records and dataset loading
//! - [`scoring`] - Result-set comparison, confusion accumulation, case
//!   evaluation, and metric derivation
//! - [`executor`] - Query execution against a SPARQL endpoint
//! - [`report`] - Flat tabular report assembly and CSV serialization
//! - [`config`] - Shared configuration constants
//! - [`error`] - Error types for execution, dataset loading, and reporting
//! - [`test_utils`] - Canned query executor for tests

pub mod config;
pub mod dataset;
pub mod error;
pub mod executor;
pub mod report;
pub mod scoring;
pub mod test_utils;
