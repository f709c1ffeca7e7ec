//! Human-readable run summary.
//!
//! The CSV report carries the full metric tables; the terminal summary shows
//! the handful of numbers someone comparing model runs actually scans for.

use graphbench_core::scoring::{BucketKey, EvaluationRun, Granularity, MetricsRecord};
use std::path::Path;

/// Formats the post-run summary.
pub fn format_summary(run: &EvaluationRun, report_path: &Path) -> String {
    let query = MetricsRecord::from_counts(
        &run.accumulator()
            .snapshot(BucketKey::Overall, Granularity::QueryLevel),
    );
    let item = MetricsRecord::from_counts(
        &run.accumulator()
            .snapshot(BucketKey::Overall, Granularity::ItemLevel),
    );

    let mut output = String::new();
    output.push_str(&format!(
        "Scored {} case{} ({} failed)\n",
        run.total_cases(),
        if run.total_cases() == 1 { "" } else { "s" },
        run.failed_cases()
    ));
    output.push_str(&format!(
        "Query-level: accuracy {:.4}, recall {:.4}\n",
        query.accuracy, query.recall
    ));
    output.push_str(&format!(
        "Item-level:  precision {:.4}, recall {:.4}, F1 {:.4}\n",
        item.precision, item.recall, item.f1_score
    ));
    output.push_str(&format!("Report written to {}", report_path.display()));
    output
}
