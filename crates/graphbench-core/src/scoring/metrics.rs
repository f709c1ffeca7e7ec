//! Classification metrics derived from confusion counts.
//!
//! All metrics share one zero-denominator policy: a division whose
//! denominator is 0 yields `0` - never an error, never NaN. An empty bucket
//! therefore reports every metric as 0 rather than poisoning downstream
//! aggregation. The formulas apply identically to query-level and item-level
//! snapshots.

use crate::scoring::confusion::ConfusionCounts;
use serde::Serialize;

/// Derived metrics for one confusion-count snapshot.
///
/// Read-only: computed at report time and never written back into the
/// accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsRecord {
    /// Total number of counted units (`TP+FN+FP+TN`).
    pub support: u64,
    /// `(TP+TN) / support`
    pub accuracy: f64,
    /// `1 - accuracy` (0 when support is 0)
    pub error_rate: f64,
    /// `TP / (TP+FP)`
    pub precision: f64,
    /// `TP / (TP+FN)`
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1_score: f64,
    /// `FN / (TP+FN)`
    pub false_negative_rate: f64,
    /// `FP / (TP+FP)`
    pub false_positive_rate: f64,
}

impl MetricsRecord {
    /// Computes all metrics from a counts snapshot.
    pub fn from_counts(counts: &ConfusionCounts) -> Self {
        let support = counts.support();
        let accuracy = ratio(counts.true_positives + counts.true_negatives, support);
        let error_rate = if support == 0 { 0.0 } else { 1.0 - accuracy };
        let precision = ratio(
            counts.true_positives,
            counts.true_positives + counts.false_positives,
        );
        let recall = ratio(
            counts.true_positives,
            counts.true_positives + counts.false_negatives,
        );
        let f1_score = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        let false_negative_rate = ratio(
            counts.false_negatives,
            counts.true_positives + counts.false_negatives,
        );
        let false_positive_rate = ratio(
            counts.false_positives,
            counts.true_positives + counts.false_positives,
        );

        Self {
            support,
            accuracy,
            error_rate,
            precision,
            recall,
            f1_score,
            false_negative_rate,
            false_positive_rate,
        }
    }

    /// The metrics as `(name, value)` pairs in report order.
    pub fn named(&self) -> [(&'static str, f64); 8] {
        [
            ("support", self.support as f64),
            ("accuracy", self.accuracy),
            ("error_rate", self.error_rate),
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1_score", self.f1_score),
            ("false_negative_rate", self.false_negative_rate),
            ("false_positive_rate", self.false_positive_rate),
        ]
    }
}

/// Division with the zero-denominator-yields-zero policy.
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
