//! Aggregate quality statistics.
//!
//! [`Stats`] only ever counts up, and every update is commutative, so the
//! result does not depend on the order in which workers finish. A [`Snapshot`]
//! is the JSON shape written for periodic checkpoints and the final summary.

use crate::issue::{Issue, Kind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Running counts over all processed records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Occurrences per issue kind.
    pub issue_distribution: BTreeMap<Kind, u64>,
    /// Number of records per issue count.
    pub issues_per_record: BTreeMap<usize, u64>,
    /// Lines dropped because they could not be decoded (lenient mode only).
    pub skipped: u64,
}

impl Stats {
    /// Empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the issue list of one record.
    pub fn record(&mut self, issues: &[Issue]) {
        *self.issues_per_record.entry(issues.len()).or_insert(0) += 1;
        for issue in issues {
            *self.issue_distribution.entry(issue.kind).or_insert(0) += 1;
        }
    }

    /// Count one undecodable line.
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Add another set of counts into this one.
    pub fn merge(&mut self, other: &Stats) {
        for (kind, count) in &other.issue_distribution {
            *self.issue_distribution.entry(*kind).or_insert(0) += count;
        }
        for (issues, count) in &other.issues_per_record {
            *self.issues_per_record.entry(*issues).or_insert(0) += count;
        }
        self.skipped += other.skipped;
    }

    /// Build statistics from a sequence of per-record issue lists.
    pub fn from_issue_lists<'a, I>(lists: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec<Issue>>,
    {
        let mut stats = Stats::new();
        for issues in lists {
            stats.record(issues);
        }
        stats
    }

    /// Records processed.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.issues_per_record.values().sum()
    }

    /// Records with at least one issue.
    #[must_use]
    pub fn damaged(&self) -> u64 {
        self.issues_per_record
            .iter()
            .filter(|(issues, _)| **issues > 0)
            .map(|(_, count)| count)
            .sum()
    }

    /// Percentage of damaged records; zero when nothing was processed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        100.0 * self.damaged() as f64 / total as f64
    }

    /// Freeze the current counts into a serializable snapshot.
    #[must_use]
    pub fn snapshot(&self, start: DateTime<Utc>) -> Snapshot {
        let elapsed = (Utc::now() - start)
            .to_std()
            .map_or(0.0, |d| d.as_secs_f64());
        Snapshot {
            dist: self
                .issue_distribution
                .iter()
                .map(|(kind, count)| (kind.name(), *count))
                .collect(),
            errcount: self
                .issues_per_record
                .iter()
                .map(|(issues, count)| (issues.to_string(), *count))
                .collect(),
            total: self.total(),
            damaged: self.damaged(),
            ratio: format!("{:.3}", self.ratio()),
            skipped: self.skipped,
            start,
            elapsed,
        }
    }
}

/// Serialized form of [`Stats`] at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Kind name to number of occurrences.
    pub dist: BTreeMap<&'static str, u64>,
    /// Issue count (as string) to number of records.
    pub errcount: BTreeMap<String, u64>,
    /// Records processed.
    pub total: u64,
    /// Records with at least one issue.
    pub damaged: u64,
    /// `100 * damaged / total` with three decimals.
    pub ratio: String,
    /// Undecodable lines skipped; omitted when zero.
    #[serde(skip_serializing_if = "is_zero")]
    pub skipped: u64,
    /// Run start.
    pub start: DateTime<Utc>,
    /// Seconds since run start.
    pub elapsed: f64,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(n: &u64) -> bool {
    *n == 0
}
