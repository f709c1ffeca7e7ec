//! Test case records and dataset loading.
//!
//! A dataset is a sequence of question/answer records produced by a model
//! evaluation run. Two layouts are accepted:
//!
//! ```text
//! results.json     # a single JSON array of case objects
//! results.jsonl    # one case object per line, blank lines skipped
//! ```
//!
//! Each case object carries the question, its question type, the gold answer
//! and/or gold SPARQL query, and the candidate side produced by the model
//! under evaluation: either a generated SPARQL query (executed at scoring
//! time) or a generated answer (compared directly). Field names follow the
//! historical result files, including their legacy aliases.
//!
//! Cases are immutable once loaded; loading failures are fatal and occur
//! before any scoring begins.

use crate::config::UNKNOWN_CATEGORY;
use crate::error::DatasetError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A gold or generated answer: either a list of result strings or a single
/// boolean (for yes/no questions).
///
/// The two shapes are unified at scoring time by normalizing booleans to the
/// singleton sets `{"yes"}` / `{"no"}` (see [`crate::scoring::comparator`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// A yes/no answer to an ASK-style question.
    YesNo(bool),
    /// An unordered list of result strings.
    Items(Vec<String>),
}

/// One evaluation case, loaded from a dataset file and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    /// The natural-language question.
    #[serde(default)]
    pub question: String,

    /// Question type used as the category bucket; `"unknown"` when absent.
    #[serde(rename = "question_type", default = "unknown_category")]
    pub category: String,

    /// Gold answer, when the dataset pre-supplies it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,

    /// Gold SPARQL query.
    #[serde(rename = "sparql", default, skip_serializing_if = "Option::is_none")]
    pub gold_query: Option<String>,

    /// Candidate SPARQL query generated by the model under evaluation.
    #[serde(
        rename = "generated_sparql",
        alias = "sparql_response",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub candidate_query: Option<String>,

    /// Candidate answer, when the model answered directly instead of
    /// generating a query.
    #[serde(
        rename = "generated_answer",
        alias = "deepseek-answer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub candidate_answer: Option<Answer>,
}

fn unknown_category() -> String {
    UNKNOWN_CATEGORY.to_string()
}

impl TestCase {
    /// Returns true when scoring this case will execute queries against the
    /// graph store (the candidate side is a generated query rather than a
    /// pre-supplied answer).
    pub fn needs_execution(&self) -> bool {
        self.candidate_answer.is_none() && non_empty(self.candidate_query.as_deref()).is_some()
    }
}

/// Returns the string when it is present and not blank.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Loads test cases from a dataset file.
///
/// `.jsonl` files are read line by line; anything else is parsed as one JSON
/// array. Errors are fatal: a batch never starts on a partially readable
/// dataset.
pub fn load_test_cases(path: &Path) -> Result<Vec<TestCase>, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::MissingFile(path.display().to_string()));
    }

    if path.extension().is_some_and(|ext| ext == "jsonl") {
        load_json_lines(path)
    } else {
        let contents = std::fs::read_to_string(path)?;
        let cases: Vec<TestCase> = serde_json::from_str(&contents)?;
        Ok(cases)
    }
}

fn load_json_lines(path: &Path) -> Result<Vec<TestCase>, DatasetError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut cases = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(case) => cases.push(case),
            Err(e) => {
                return Err(DatasetError::InvalidFormat(format!(
                    "Line {}: {}",
                    line_num + 1,
                    e
                )));
            }
        }
    }

    Ok(cases)
}
