//! The Panel Store — the immutable raw dataset and its month axis.
//!
//! RULE: a panel is created once at load time and never mutated.
//! Everything downstream (classified rows, month slices, delta rows,
//! rankings) is a transient projection recomputed from it in full.

use crate::{model::FeatureRow, types::MonthKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panel {
    rows: Vec<FeatureRow>,
    months: Vec<MonthKey>,
}

impl Panel {
    /// Build a panel from rows plus the authoritative month list
    /// (normally the one from `meta.json`). The list is sorted and
    /// de-duplicated; rows are stored as given.
    pub fn new(rows: Vec<FeatureRow>, mut months: Vec<MonthKey>) -> Self {
        months.sort();
        months.dedup();
        Self { rows, months }
    }

    /// Build a panel with no external month list: the ordered distinct
    /// months are derived from the rows themselves.
    pub fn from_rows(rows: Vec<FeatureRow>) -> Self {
        let months: BTreeSet<MonthKey> = rows.iter().map(|r| r.month.clone()).collect();
        Self {
            rows,
            months: months.into_iter().collect(),
        }
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Ordered distinct months covering the panel range, oldest first.
    pub fn months(&self) -> &[MonthKey] {
        &self.months
    }

    pub fn latest_month(&self) -> Option<&MonthKey> {
        self.months.last()
    }

    /// Number of distinct areas appearing anywhere in the panel.
    pub fn area_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.area_id.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Convenience wrapper over [`select_month`] for the stored rows.
    pub fn month_slice(&self, month: &str) -> Vec<FeatureRow> {
        select_month(&self.rows, month)
    }
}

/// The Slice Selector: every row whose `month` matches exactly, in input
/// order. Empty when the month is absent or `rows` is empty. O(n).
pub fn select_month(rows: &[FeatureRow], month: &str) -> Vec<FeatureRow> {
    rows.iter().filter(|r| r.month == month).cloned().collect()
}
