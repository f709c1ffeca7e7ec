//! Per-case evaluation and batch recording.
//!
//! Each case moves through a small state machine: pending, then either
//! executed (both result sets resolved) or failed (execution error, timeout,
//! or a missing/blank side), then scored. The resolution rule follows the
//! candidate side so both sets always live in the same normalization domain:
//!
//! - candidate answered directly -> compare against the pre-supplied gold
//!   answer;
//! - candidate is a generated query -> execute both the candidate and the
//!   gold query against the graph store.
//!
//! A failed case is scored as one query-level false negative with no
//! item-level contribution - the candidate is conservatively assumed wrong.
//! Failures are logged with their case index and never abort the batch.
//!
//! Query-level true negatives and false positives are structurally impossible
//! under the exact-match policy and stay 0 in every bucket.

use crate::dataset::{non_empty, TestCase};
use crate::error::ExecutionError;
use crate::executor::QueryExecutor;
use crate::scoring::comparator::{compare, normalize_answer_pair, ResultSet};
use crate::scoring::confusion::{Accumulator, BucketKey, ConfusionCounts, Granularity};
use thiserror::Error;

/// Why a case could not be scored.
#[derive(Debug, Clone, Error)]
pub enum CaseFailure {
    /// Neither a gold answer nor a usable gold query was supplied
    #[error("gold side missing: no answer or query supplied")]
    MissingGold,
    /// Neither a candidate answer nor a usable candidate query was supplied
    #[error("candidate side missing: no answer or query supplied")]
    MissingCandidate,
    /// The case requires query execution but no executor was configured
    #[error("no query executor configured")]
    NoExecutor,
    /// Query execution failed or timed out
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// Terminal state of one evaluated case.
#[derive(Debug, Clone)]
pub enum CaseOutcome {
    /// Both result sets resolved and were compared.
    Scored {
        /// Whether the candidate set equals the gold set exactly.
        exact_match: bool,
        /// Item-level set-arithmetic counts.
        item_counts: ConfusionCounts,
    },
    /// The case could not be scored.
    Failed(CaseFailure),
}

impl CaseOutcome {
    /// Query-level contribution: a hit on exact match, a miss otherwise
    /// (including failures).
    pub fn query_counts(&self) -> ConfusionCounts {
        match self {
            CaseOutcome::Scored { exact_match, .. } => {
                ConfusionCounts::query_outcome(*exact_match)
            }
            CaseOutcome::Failed(_) => ConfusionCounts::query_outcome(false),
        }
    }

    /// Item-level contribution; failed cases contribute nothing.
    pub fn item_counts(&self) -> Option<ConfusionCounts> {
        match self {
            CaseOutcome::Scored { item_counts, .. } => Some(*item_counts),
            CaseOutcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CaseOutcome::Failed(_))
    }
}

/// Scores single cases against an optional query executor.
///
/// The executor is an explicit dependency: runs over pre-supplied answers
/// need none, runs over generated queries receive one from the caller.
pub struct CaseEvaluator<'a> {
    executor: Option<&'a dyn QueryExecutor>,
}

impl<'a> CaseEvaluator<'a> {
    /// Creates an evaluator backed by a query executor.
    pub fn new(executor: &'a dyn QueryExecutor) -> Self {
        Self {
            executor: Some(executor),
        }
    }

    /// Creates an evaluator for answers-only datasets. Any case that needs
    /// query execution fails with [`CaseFailure::NoExecutor`].
    pub fn without_executor() -> Self {
        Self { executor: None }
    }

    /// Evaluates one case to its terminal state. Never returns an error:
    /// every failure mode becomes a [`CaseOutcome::Failed`].
    pub async fn evaluate(&self, case: &TestCase) -> CaseOutcome {
        match self.resolve_sets(case).await {
            Ok((gold, candidate)) => CaseOutcome::Scored {
                exact_match: gold == candidate,
                item_counts: compare(&gold, &candidate),
            },
            Err(failure) => CaseOutcome::Failed(failure),
        }
    }

    async fn resolve_sets(&self, case: &TestCase) -> Result<(ResultSet, ResultSet), CaseFailure> {
        if let Some(candidate) = &case.candidate_answer {
            let gold = case.answer.as_ref().ok_or(CaseFailure::MissingGold)?;
            return Ok(normalize_answer_pair(gold, candidate));
        }

        let candidate_query =
            non_empty(case.candidate_query.as_deref()).ok_or(CaseFailure::MissingCandidate)?;
        let gold_query = non_empty(case.gold_query.as_deref()).ok_or(CaseFailure::MissingGold)?;
        let executor = self.executor.ok_or(CaseFailure::NoExecutor)?;

        let candidate = executor.execute(candidate_query).await?;
        let gold = executor.execute(gold_query).await?;
        Ok((gold, candidate))
    }
}

/// Running state of one batch evaluation pass.
///
/// Folds each recorded outcome into the case's category bucket and the
/// overall bucket, and remembers which case indices missed at query level
/// (for failure reporting and mismatch export).
#[derive(Debug, Default)]
pub struct EvaluationRun {
    accumulator: Accumulator,
    total_cases: usize,
    failed_cases: usize,
    mismatched: Vec<usize>,
}

impl EvaluationRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one case outcome into the totals. Call exactly once per case.
    pub fn record(&mut self, index: usize, category: &str, outcome: &CaseOutcome) {
        self.total_cases += 1;

        let query_counts = outcome.query_counts();
        self.accumulator.fold(
            BucketKey::Category(category),
            Granularity::QueryLevel,
            query_counts,
        );
        self.accumulator
            .fold(BucketKey::Overall, Granularity::QueryLevel, query_counts);

        if let Some(item_counts) = outcome.item_counts() {
            self.accumulator.fold(
                BucketKey::Category(category),
                Granularity::ItemLevel,
                item_counts,
            );
            self.accumulator
                .fold(BucketKey::Overall, Granularity::ItemLevel, item_counts);
        }

        match outcome {
            CaseOutcome::Failed(failure) => {
                self.failed_cases += 1;
                self.mismatched.push(index);
                tracing::warn!(
                    case = index,
                    category,
                    error = %failure,
                    "case failed; scored as query-level false negative"
                );
            }
            CaseOutcome::Scored { exact_match: false, .. } => self.mismatched.push(index),
            CaseOutcome::Scored { .. } => {}
        }
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn total_cases(&self) -> usize {
        self.total_cases
    }

    pub fn failed_cases(&self) -> usize {
        self.failed_cases
    }

    /// Indices of cases whose query-level outcome was a false negative
    /// (wrong result set, execution failure, or malformed case), in dataset
    /// order.
    pub fn mismatched_indices(&self) -> &[usize] {
        &self.mismatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Answer;
    use crate::test_utils::StaticExecutor;

    fn query_case(category: &str, gold: &str, candidate: &str) -> TestCase {
        TestCase {
            question: "q".into(),
            category: category.into(),
            answer: None,
            gold_query: Some(gold.into()),
            candidate_query: Some(candidate.into()),
            candidate_answer: None,
        }
    }

    fn answer_case(category: &str, gold: Answer, candidate: Answer) -> TestCase {
        TestCase {
            question: "q".into(),
            category: category.into(),
            answer: Some(gold),
            gold_query: None,
            candidate_query: None,
            candidate_answer: Some(candidate),
        }
    }

    #[tokio::test]
    async fn test_exact_match_scores_query_hit() {
        let executor = StaticExecutor::new()
            .with_items("GOLD", &["a", "b"])
            .with_items("CAND", &["a", "b"]);
        let evaluator = CaseEvaluator::new(&executor);

        let outcome = evaluator.evaluate(&query_case("t", "GOLD", "CAND")).await;
        match outcome {
            CaseOutcome::Scored {
                exact_match,
                item_counts,
            } => {
                assert!(exact_match);
                assert_eq!(item_counts.true_positives, 2);
                assert_eq!(item_counts.false_negatives, 0);
                assert_eq!(item_counts.false_positives, 0);
            }
            other => panic!("expected Scored, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_becomes_failed_outcome() {
        let executor = StaticExecutor::new()
            .with_items("GOLD", &["a"])
            .with_error("CAND", ExecutionError::Timeout { seconds: 30 });
        let evaluator = CaseEvaluator::new(&executor);

        let outcome = evaluator.evaluate(&query_case("t", "GOLD", "CAND")).await;
        assert!(outcome.is_failed());
        assert_eq!(outcome.query_counts().false_negatives, 1);
        assert_eq!(outcome.item_counts(), None);
    }

    #[tokio::test]
    async fn test_missing_candidate_is_failed() {
        let evaluator = CaseEvaluator::without_executor();
        let case = TestCase {
            question: "q".into(),
            category: "t".into(),
            answer: Some(Answer::Items(vec!["a".into()])),
            gold_query: None,
            candidate_query: Some("".into()),
            candidate_answer: None,
        };
        let outcome = evaluator.evaluate(&case).await;
        assert!(matches!(
            outcome,
            CaseOutcome::Failed(CaseFailure::MissingCandidate)
        ));
    }

    #[tokio::test]
    async fn test_answers_only_case_needs_no_executor() {
        let evaluator = CaseEvaluator::without_executor();
        let case = answer_case(
            "yes_no",
            Answer::Items(vec!["YES".into()]),
            Answer::YesNo(false),
        );
        let outcome = evaluator.evaluate(&case).await;
        match outcome {
            CaseOutcome::Scored {
                exact_match,
                item_counts,
            } => {
                assert!(!exact_match);
                // {"yes"} vs {"no"}
                assert_eq!(item_counts.false_negatives, 1);
                assert_eq!(item_counts.false_positives, 1);
            }
            other => panic!("expected Scored, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_folds_into_category_and_overall() {
        let evaluator = CaseEvaluator::without_executor();
        let mut run = EvaluationRun::new();

        let cases = [
            answer_case(
                "genre",
                Answer::Items(vec!["Drama".into()]),
                Answer::Items(vec!["Drama".into()]),
            ),
            answer_case(
                "genre",
                Answer::Items(vec!["Drama".into()]),
                Answer::Items(vec!["Horror".into()]),
            ),
        ];
        for (idx, case) in cases.iter().enumerate() {
            let outcome = evaluator.evaluate(case).await;
            run.record(idx, &case.category, &outcome);
        }

        let category = run
            .accumulator()
            .snapshot(BucketKey::Category("genre"), Granularity::QueryLevel);
        let overall = run
            .accumulator()
            .snapshot(BucketKey::Overall, Granularity::QueryLevel);
        assert_eq!(category, overall);
        assert_eq!(category.true_positives, 1);
        assert_eq!(category.false_negatives, 1);
        // Structural invariant of the exact-match policy.
        assert_eq!(category.false_positives, 0);
        assert_eq!(category.true_negatives, 0);

        assert_eq!(run.total_cases(), 2);
        assert_eq!(run.failed_cases(), 0);
        assert_eq!(run.mismatched_indices(), &[1]);
    }

    #[tokio::test]
    async fn test_failed_case_counts_and_logs_index() {
        let evaluator = CaseEvaluator::without_executor();
        let mut run = EvaluationRun::new();

        let case = query_case("year", "GOLD", "CAND");
        let outcome = evaluator.evaluate(&case).await;
        assert!(matches!(
            outcome,
            CaseOutcome::Failed(CaseFailure::NoExecutor)
        ));
        run.record(0, &case.category, &outcome);

        assert_eq!(run.failed_cases(), 1);
        assert_eq!(run.mismatched_indices(), &[0]);
        let item = run
            .accumulator()
            .snapshot(BucketKey::Overall, Granularity::ItemLevel);
        assert_eq!(item, ConfusionCounts::default());
    }
}
