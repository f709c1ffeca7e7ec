//! Query execution against a SPARQL endpoint.
//!
//! The scoring core only depends on the [`QueryExecutor`] trait; the concrete
//! [`HttpSparqlExecutor`] speaks the SPARQL 1.1 protocol over HTTP and parses
//! `application/sparql-results+json` documents. Every request is bounded by a
//! per-request deadline so a pathological generated query cannot stall the
//! batch: a timed-out request surfaces as [`ExecutionError::Timeout`] and is
//! scored like any other execution failure.
//!
//! SELECT results normalize to one [`ResultItem`] per row - the bound values
//! joined in `head.vars` order - and ASK results normalize to the yes/no
//! singleton, so executed and pre-supplied answers share one comparison
//! domain.

use crate::config::DEFAULT_QUERY_TIMEOUT_SECS;
use crate::error::ExecutionError;
use crate::scoring::comparator::{ResultItem, ResultSet};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Separator between bound values in a normalized row representation.
const ROW_SEPARATOR: &str = "\t";

/// An external capability that evaluates one query to a result set.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Executes a query and returns its normalized result set.
    async fn execute(&self, query: &str) -> Result<ResultSet, ExecutionError>;
}

// ============================================================================
// SPARQL JSON results format
// ============================================================================

/// An `application/sparql-results+json` document (SELECT or ASK).
#[derive(Debug, Deserialize)]
struct SparqlResultsDocument {
    #[serde(default)]
    head: SparqlHead,
    #[serde(default)]
    boolean: Option<bool>,
    #[serde(default)]
    results: Option<SparqlBindings>,
}

#[derive(Debug, Default, Deserialize)]
struct SparqlHead {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SparqlBindings {
    #[serde(default)]
    bindings: Vec<HashMap<String, SparqlTerm>>,
}

/// One RDF term in a binding. Only the lexical value takes part in
/// comparison; term type and datatype are ignored.
#[derive(Debug, Deserialize)]
struct SparqlTerm {
    value: String,
}

impl SparqlResultsDocument {
    fn into_result_set(self) -> Result<ResultSet, ExecutionError> {
        if let Some(boolean) = self.boolean {
            return Ok(ResultSet::from_bool(boolean));
        }

        let results = self.results.ok_or_else(|| {
            ExecutionError::InvalidResponse(
                "document carries neither a boolean nor bindings".to_string(),
            )
        })?;

        let mut set = ResultSet::new();
        for binding in &results.bindings {
            set.insert(normalize_row(&self.head.vars, binding));
        }
        Ok(set)
    }
}

/// Joins a row's bound values in variable order. Unbound variables
/// contribute an empty field so rows stay positionally comparable.
fn normalize_row(vars: &[String], binding: &HashMap<String, SparqlTerm>) -> ResultItem {
    let fields: Vec<&str> = vars
        .iter()
        .map(|var| binding.get(var).map(|term| term.value.as_str()).unwrap_or(""))
        .collect();
    ResultItem::new(fields.join(ROW_SEPARATOR))
}

// ============================================================================
// HTTP executor
// ============================================================================

/// Executes queries against a SPARQL 1.1 endpoint over HTTP.
///
/// The executor is passed to the evaluator as an explicit dependency - it is
/// never ambient state - so runs against different endpoints or fake
/// executors in tests need no global setup.
pub struct HttpSparqlExecutor {
    client: reqwest::Client,
    endpoint: Url,
    timeout_secs: u64,
}

impl HttpSparqlExecutor {
    /// Creates an executor with the default per-query timeout.
    pub fn new(endpoint: &str) -> Result<Self, ExecutionError> {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS))
    }

    /// Creates an executor with a custom per-query timeout.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, ExecutionError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ExecutionError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(ExecutionError::InvalidEndpoint(format!(
                "unsupported scheme: {} (only http/https allowed)",
                endpoint.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("graphbench/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ExecutionError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Verifies the endpoint is reachable by running a trivial ASK query.
    ///
    /// Unlike per-case failures, a connectivity failure is fatal: callers
    /// should abort the run before any accumulation begins.
    pub async fn check_connectivity(&self) -> Result<(), ExecutionError> {
        self.execute("ASK { }").await.map(|_| ())
    }

    fn map_request_error(&self, error: reqwest::Error) -> ExecutionError {
        if error.is_timeout() {
            ExecutionError::Timeout {
                seconds: self.timeout_secs,
            }
        } else {
            ExecutionError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl QueryExecutor for HttpSparqlExecutor {
    async fn execute(&self, query: &str) -> Result<ResultSet, ExecutionError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/sparql-results+json")
            .form(&[("query", query)])
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ExecutionError::Endpoint {
                status: status.as_u16(),
                message: truncate(&message, 200),
            });
        }

        let document: SparqlResultsDocument = response
            .json()
            .await
            .map_err(|e| ExecutionError::InvalidResponse(e.to_string()))?;
        document.into_result_set()
    }
}

/// Truncates endpoint error bodies so logs stay readable.
fn truncate(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        text.to_string()
    } else {
        let mut end = max_len;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(document: &str) -> SparqlResultsDocument {
        serde_json::from_str(document).unwrap()
    }

    #[test]
    fn test_select_results_normalize_in_var_order() {
        let document = parse(
            r#"{
                "head": {"vars": ["movie", "year"]},
                "results": {"bindings": [
                    {"movie": {"type": "literal", "value": "Alien"},
                     "year": {"type": "literal", "value": "1979"}},
                    {"movie": {"type": "uri", "value": "Blade Runner"},
                     "year": {"type": "literal", "value": "1982"}}
                ]}
            }"#,
        );

        let set = document.into_result_set().unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&ResultItem::new("Alien\t1979")));
        assert!(set.contains(&ResultItem::new("Blade Runner\t1982")));
    }

    #[test]
    fn test_unbound_variable_keeps_row_positional() {
        let document = parse(
            r#"{
                "head": {"vars": ["a", "b"]},
                "results": {"bindings": [
                    {"b": {"type": "literal", "value": "only-b"}}
                ]}
            }"#,
        );

        let set = document.into_result_set().unwrap();
        assert!(set.contains(&ResultItem::new("\tonly-b")));
    }

    #[test]
    fn test_ask_results_normalize_to_boolean_set() {
        let positive = parse(r#"{"head": {}, "boolean": true}"#);
        assert_eq!(
            positive.into_result_set().unwrap(),
            ResultSet::from_bool(true)
        );

        let negative = parse(r#"{"head": {}, "boolean": false}"#);
        assert_eq!(
            negative.into_result_set().unwrap(),
            ResultSet::from_bool(false)
        );
    }

    #[test]
    fn test_empty_select_results() {
        let document = parse(r#"{"head": {"vars": ["x"]}, "results": {"bindings": []}}"#);
        assert!(document.into_result_set().unwrap().is_empty());
    }

    #[test]
    fn test_document_without_results_is_invalid() {
        let document = parse(r#"{"head": {"vars": []}}"#);
        assert!(matches!(
            document.into_result_set(),
            Err(ExecutionError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_duplicate_rows_collapse() {
        let document = parse(
            r#"{
                "head": {"vars": ["x"]},
                "results": {"bindings": [
                    {"x": {"type": "literal", "value": "same"}},
                    {"x": {"type": "literal", "value": "same"}}
                ]}
            }"#,
        );
        assert_eq!(document.into_result_set().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_endpoint_url() {
        assert!(matches!(
            HttpSparqlExecutor::new("not a url"),
            Err(ExecutionError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            HttpSparqlExecutor::new("ftp://example.com/sparql"),
            Err(ExecutionError::InvalidEndpoint(_))
        ));
        assert!(HttpSparqlExecutor::new("http://localhost:7200/repositories/imkg").is_ok());
    }

    #[test]
    fn test_truncate_error_body() {
        assert_eq!(truncate("short", 200), "short");
        let long = "x".repeat(300);
        let truncated = truncate(&long, 200);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.len(), 203);
    }
}
