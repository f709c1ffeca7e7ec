//! Confusion-count accumulation across buckets and granularities.
//!
//! Every scored case folds into exactly two buckets: the bucket of its
//! question type (created lazily, kept in first-seen order) and the overall
//! bucket. Each bucket tracks independent totals per granularity.
//!
//! Combining counts is field-wise addition - commutative and associative - so
//! independently filled accumulators (e.g. from sharded workers) can be
//! merged into the same totals a sequential pass would produce. The
//! accumulator itself is single-writer: parallel callers each own one and
//! merge afterwards.

use crate::config::OVERALL_BUCKET;
use indexmap::IndexMap;
use serde::Serialize;

/// Four running confusion totals.
///
/// Totals only grow during an accumulation pass; nothing is ever subtracted
/// or re-folded. Callers fold each case exactly once per granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionCounts {
    #[serde(rename = "TP")]
    pub true_positives: u64,
    #[serde(rename = "FN")]
    pub false_negatives: u64,
    #[serde(rename = "FP")]
    pub false_positives: u64,
    #[serde(rename = "TN")]
    pub true_negatives: u64,
}

impl ConfusionCounts {
    /// Counts for a query-level outcome: one hit or one miss.
    pub fn query_outcome(exact_match: bool) -> Self {
        if exact_match {
            Self {
                true_positives: 1,
                ..Self::default()
            }
        } else {
            Self {
                false_negatives: 1,
                ..Self::default()
            }
        }
    }

    /// Adds another set of counts field-wise.
    pub fn add(&mut self, other: Self) {
        self.true_positives += other.true_positives;
        self.false_negatives += other.false_negatives;
        self.false_positives += other.false_positives;
        self.true_negatives += other.true_negatives;
    }

    /// Returns the field-wise sum of two counts.
    pub fn combined(mut self, other: Self) -> Self {
        self.add(other);
        self
    }

    /// Total of all four fields (the support of derived metrics).
    pub fn support(&self) -> u64 {
        self.true_positives + self.false_negatives + self.false_positives + self.true_negatives
    }

    /// The counts as `(name, value)` pairs in report order.
    pub fn named(&self) -> [(&'static str, u64); 4] {
        [
            ("TP", self.true_positives),
            ("FN", self.false_negatives),
            ("FP", self.false_positives),
            ("TN", self.true_negatives),
        ]
    }
}

/// Scoring granularity of a fold or snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// The whole case is one pass/fail unit.
    QueryLevel,
    /// Each result row is scored individually.
    ItemLevel,
}

/// Accumulation target of a fold: a question-type bucket or the overall
/// bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketKey<'a> {
    Category(&'a str),
    Overall,
}

#[derive(Debug, Clone, Copy, Default)]
struct BucketCounts {
    query: ConfusionCounts,
    item: ConfusionCounts,
}

impl BucketCounts {
    fn at(&self, granularity: Granularity) -> ConfusionCounts {
        match granularity {
            Granularity::QueryLevel => self.query,
            Granularity::ItemLevel => self.item,
        }
    }

    fn at_mut(&mut self, granularity: Granularity) -> &mut ConfusionCounts {
        match granularity {
            Granularity::QueryLevel => &mut self.query,
            Granularity::ItemLevel => &mut self.item,
        }
    }
}

/// Running confusion totals for every bucket of one evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    categories: IndexMap<String, BucketCounts>,
    overall: BucketCounts,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds counts field-wise into a bucket's running total, creating the
    /// bucket zeroed if it does not exist yet.
    pub fn fold(&mut self, bucket: BucketKey<'_>, granularity: Granularity, counts: ConfusionCounts) {
        match bucket {
            BucketKey::Overall => self.overall.at_mut(granularity).add(counts),
            BucketKey::Category(label) => self
                .categories
                .entry(label.to_string())
                .or_default()
                .at_mut(granularity)
                .add(counts),
        }
    }

    /// An immutable copy of a bucket's current counts. Unknown categories
    /// snapshot as zero.
    pub fn snapshot(&self, bucket: BucketKey<'_>, granularity: Granularity) -> ConfusionCounts {
        match bucket {
            BucketKey::Overall => self.overall.at(granularity),
            BucketKey::Category(label) => self
                .categories
                .get(label)
                .map(|bucket| bucket.at(granularity))
                .unwrap_or_default(),
        }
    }

    /// Category labels in first-seen order. The overall bucket is implicit
    /// and not listed.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Label of the implicit overall bucket.
    pub fn overall_label(&self) -> &'static str {
        OVERALL_BUCKET
    }

    /// Merges another accumulator into this one (sharded evaluation).
    ///
    /// Categories first seen by `other` append after this accumulator's own.
    pub fn merge(&mut self, other: Accumulator) {
        for (label, counts) in other.categories {
            let bucket = self.categories.entry(label).or_default();
            bucket.query.add(counts.query);
            bucket.item.add(counts.item);
        }
        self.overall.query.add(other.overall.query);
        self.overall.item.add(other.overall.item);
    }
}
