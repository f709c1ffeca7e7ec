//! Flat tabular report assembly and CSV serialization.
//!
//! The report is a flat sequence of rows - no nesting - so it serializes
//! directly as delimited text or a JSON array:
//!
//! ```text
//! Section,Question Type,Metric Group,Metric,Value
//! Per Question Type Analysis,genre,Query-Level Counts,TP,12
//! Per Question Type Analysis,genre,Query-Level Metrics,accuracy,0.8000
//! ...
//! Overall Analysis,overall,Item-Level Metrics,f1_score,0.9143
//! ```
//!
//! Buckets appear in first-seen category order with the overall bucket last.
//! Counts render as integers; derived values render with fixed precision.

use crate::config::REPORT_DECIMALS;
use crate::error::ReportError;
use crate::scoring::confusion::{Accumulator, BucketKey, ConfusionCounts, Granularity};
use crate::scoring::metrics::MetricsRecord;
use serde::Serialize;
use std::io::Write;

/// Section label for question-type buckets.
pub const SECTION_PER_CATEGORY: &str = "Per Question Type Analysis";
/// Section label for the overall bucket.
pub const SECTION_OVERALL: &str = "Overall Analysis";

const GROUP_QUERY_COUNTS: &str = "Query-Level Counts";
const GROUP_QUERY_METRICS: &str = "Query-Level Metrics";
const GROUP_ITEM_COUNTS: &str = "Item-Level Counts";
const GROUP_ITEM_METRICS: &str = "Item-Level Metrics";
const GROUP_AVG_ITEMS: &str = "Average Item-Level Counts per Query";

/// A raw count or a derived value; the distinction drives formatting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportValue {
    Count(u64),
    Ratio(f64),
}

impl ReportValue {
    /// Renders the value for delimited output: counts as integers, ratios
    /// with fixed precision.
    pub fn render(&self) -> String {
        match self {
            ReportValue::Count(value) => value.to_string(),
            ReportValue::Ratio(value) => format!("{:.prec$}", value, prec = REPORT_DECIMALS),
        }
    }
}

/// One record of the flat report stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub section: String,
    pub category: String,
    pub metric_group: String,
    pub metric: String,
    pub value: ReportValue,
}

/// Assembles the full report from an accumulator.
///
/// Every bucket emits five groups: query-level counts and metrics,
/// item-level counts and metrics, and the average item-level counts per
/// query (item totals divided by the bucket's query-level support, 0 when
/// the bucket is empty). An empty run still emits the overall bucket, with
/// every value 0.
pub fn assemble_report(accumulator: &Accumulator) -> Vec<ReportRow> {
    let mut rows = Vec::new();

    for category in accumulator.categories() {
        push_bucket_rows(
            &mut rows,
            accumulator,
            SECTION_PER_CATEGORY,
            category,
            BucketKey::Category(category),
        );
    }
    push_bucket_rows(
        &mut rows,
        accumulator,
        SECTION_OVERALL,
        accumulator.overall_label(),
        BucketKey::Overall,
    );

    rows
}

fn push_bucket_rows(
    rows: &mut Vec<ReportRow>,
    accumulator: &Accumulator,
    section: &str,
    label: &str,
    bucket: BucketKey<'_>,
) {
    let query_counts = accumulator.snapshot(bucket, Granularity::QueryLevel);
    let item_counts = accumulator.snapshot(bucket, Granularity::ItemLevel);

    push_counts(rows, section, label, GROUP_QUERY_COUNTS, &query_counts);
    push_metrics(rows, section, label, GROUP_QUERY_METRICS, &query_counts);
    push_counts(rows, section, label, GROUP_ITEM_COUNTS, &item_counts);
    push_metrics(rows, section, label, GROUP_ITEM_METRICS, &item_counts);

    // Average item-level counts per scored query.
    let queries = query_counts.support();
    for (name, value) in item_counts.named() {
        let average = if queries == 0 {
            0.0
        } else {
            value as f64 / queries as f64
        };
        rows.push(row(section, label, GROUP_AVG_ITEMS, name, ReportValue::Ratio(average)));
    }
}

fn push_counts(
    rows: &mut Vec<ReportRow>,
    section: &str,
    label: &str,
    group: &str,
    counts: &ConfusionCounts,
) {
    for (name, value) in counts.named() {
        rows.push(row(section, label, group, name, ReportValue::Count(value)));
    }
}

fn push_metrics(
    rows: &mut Vec<ReportRow>,
    section: &str,
    label: &str,
    group: &str,
    counts: &ConfusionCounts,
) {
    let record = MetricsRecord::from_counts(counts);
    for (name, value) in record.named() {
        rows.push(row(section, label, group, name, ReportValue::Ratio(value)));
    }
}

fn row(
    section: &str,
    category: &str,
    metric_group: &str,
    metric: &str,
    value: ReportValue,
) -> ReportRow {
    ReportRow {
        section: section.to_string(),
        category: category.to_string(),
        metric_group: metric_group.to_string(),
        metric: metric.to_string(),
        value,
    }
}

/// Writes the report as CSV.
pub fn write_csv<W: Write>(rows: &[ReportRow], writer: W) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Section", "Question Type", "Metric Group", "Metric", "Value"])?;
    for row in rows {
        csv_writer.write_record([
            row.section.as_str(),
            row.category.as_str(),
            row.metric_group.as_str(),
            row.metric.as_str(),
            row.value.render().as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}
