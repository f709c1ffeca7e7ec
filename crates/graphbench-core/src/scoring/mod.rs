//! Scoring core: set comparison, confusion accumulation, and metrics.
//!
//! A test case is scored at two granularities:
//!
//! | Granularity | Unit | Outcome |
//! |-------------|------|---------|
//! | **Query level** | the whole case | true positive iff the candidate result set equals the gold result set exactly, else false negative |
//! | **Item level** | each result row | set arithmetic between gold and candidate rows |
//!
//! Counts fold into one bucket per question type plus an overall bucket, and
//! classification metrics derive from each bucket's totals at report time.
//!
//! Execution failures (timeouts, malformed queries) never abort a batch: the
//! failed case is scored as a query-level false negative with no item-level
//! contribution, and evaluation continues.

pub mod comparator;
pub mod confusion;
pub mod evaluator;
pub mod metrics;

pub use comparator::{compare, normalize_answer_pair, ResultItem, ResultSet};
pub use confusion::{Accumulator, BucketKey, ConfusionCounts, Granularity};
pub use evaluator::{CaseEvaluator, CaseFailure, CaseOutcome, EvaluationRun};
pub use metrics::MetricsRecord;
