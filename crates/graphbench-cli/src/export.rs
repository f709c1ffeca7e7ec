//! Mismatch export for manual inspection.
//!
//! Writes the original records of every case whose query-level outcome was a
//! false negative - wrong result set, execution failure, or malformed case -
//! optionally restricted to one question type. The exported file round-trips
//! through the dataset loader, so a follow-up run can rescore just the
//! failures.

use anyhow::{Context, Result};
use graphbench_core::dataset::TestCase;
use graphbench_core::scoring::EvaluationRun;
use std::path::Path;

/// Writes mismatched cases as a JSON array; returns how many were exported.
pub fn write_mismatches(
    cases: &[TestCase],
    run: &EvaluationRun,
    category: Option<&str>,
    path: &Path,
) -> Result<usize> {
    let selected = select_mismatches(cases, run.mismatched_indices(), category);
    let json = serde_json::to_string_pretty(&selected)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write mismatch export {}", path.display()))?;
    Ok(selected.len())
}

fn select_mismatches<'a>(
    cases: &'a [TestCase],
    mismatched: &[usize],
    category: Option<&str>,
) -> Vec<&'a TestCase> {
    mismatched
        .iter()
        .filter_map(|&idx| cases.get(idx))
        .filter(|case| category.map_or(true, |wanted| case.category == wanted))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphbench_core::dataset::Answer;

    fn case(category: &str, question: &str) -> TestCase {
        TestCase {
            question: question.into(),
            category: category.into(),
            answer: Some(Answer::Items(vec!["a".into()])),
            gold_query: None,
            candidate_query: None,
            candidate_answer: Some(Answer::Items(vec!["b".into()])),
        }
    }

    #[test]
    fn test_selects_only_mismatched_indices() {
        let cases = vec![case("t1", "q0"), case("t1", "q1"), case("t2", "q2")];
        let selected = select_mismatches(&cases, &[0, 2], None);
        let questions: Vec<&str> = selected.iter().map(|c| c.question.as_str()).collect();
        assert_eq!(questions, vec!["q0", "q2"]);
    }

    #[test]
    fn test_category_filter() {
        let cases = vec![case("t1", "q0"), case("t2", "q1"), case("t1", "q2")];
        let selected = select_mismatches(&cases, &[0, 1, 2], Some("t1"));
        let questions: Vec<&str> = selected.iter().map(|c| c.question.as_str()).collect();
        assert_eq!(questions, vec!["q0", "q2"]);
    }

    #[test]
    fn test_export_round_trips_through_loader() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("wrong.json");

        let mut run = EvaluationRun::new();
        let cases = vec![case("t1", "q0"), case("t1", "q1")];
        // Mark the second case as a miss.
        run.record(
            1,
            "t1",
            &graphbench_core::scoring::CaseOutcome::Scored {
                exact_match: false,
                item_counts: Default::default(),
            },
        );

        let exported = write_mismatches(&cases, &run, None, &path).unwrap();
        assert_eq!(exported, 1);

        let reloaded = graphbench_core::dataset::load_test_cases(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].question, "q1");
    }
}
