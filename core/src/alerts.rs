//! Alert Classifier — per-row anomaly classification via rolling-window
//! statistics.
//!
//! For every (area, month) row this computes:
//!   1. `alert_spike`  — risk index above the rolling baseline of up to
//!      the 6 preceding months by more than the threshold fraction
//!   2. `alert_trend3` — risk index strictly rising over 3 consecutive months
//!   3. `alert_level`  — none (no flag) | watch (one) | warning (both)
//!
//! Pure and total: sparse history and missing indices resolve to `false`,
//! never to an error. Cross-area comparisons never occur — each area's
//! history is windowed independently.

use crate::{
    model::{AlertLevel, FeatureRow},
    types::AreaId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ── Constants ────────────────────────────────────────────────────────────────

/// Fractional rise above the baseline that triggers a spike. 0.5 = +50 %.
pub const DEFAULT_SPIKE_THRESHOLD: f64 = 0.50;
/// Months of history feeding the rolling baseline.
pub const DEFAULT_BASELINE_WINDOW: usize = 6;
/// Baseline is undefined until this many non-null points fall in the window.
pub const MIN_BASELINE_POINTS: usize = 3;

// ── Configuration ────────────────────────────────────────────────────────────

/// Classifier tunables, normally seeded from `meta.json` thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub spike_threshold: f64,
    pub baseline_window: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            spike_threshold: DEFAULT_SPIKE_THRESHOLD,
            baseline_window: DEFAULT_BASELINE_WINDOW,
        }
    }
}

// ── Classification ───────────────────────────────────────────────────────────

/// Classify every row against `threshold` with the standard 6-month window.
///
/// The threshold is a fraction in `(0, 1]` (the UI exposes 0.10–1.00), but
/// the function is total over any finite value. Every input field other
/// than the three alert fields passes through unchanged; output order is
/// ascending (`area_id`, `month`) regardless of input order.
pub fn classify(rows: &[FeatureRow], threshold: f64) -> Vec<FeatureRow> {
    classify_with(
        rows,
        &AlertConfig {
            spike_threshold: threshold,
            baseline_window: DEFAULT_BASELINE_WINDOW,
        },
    )
}

/// Classify with explicit tunables. See [`classify`].
pub fn classify_with(rows: &[FeatureRow], cfg: &AlertConfig) -> Vec<FeatureRow> {
    // Partition by area, then sort each partition chronologically.
    // BTreeMap keeps the output order deterministic (ascending area_id).
    let mut by_area: BTreeMap<AreaId, Vec<FeatureRow>> = BTreeMap::new();
    for row in rows {
        by_area.entry(row.area_id.clone()).or_default().push(row.clone());
    }

    let mut out = Vec::with_capacity(rows.len());
    for (_, mut history) in by_area {
        history.sort_by(|a, b| a.month.cmp(&b.month));

        let indices: Vec<Option<f64>> = history.iter().map(|r| r.risk_index).collect();

        for (t, mut row) in history.into_iter().enumerate() {
            let spike = spike_flag(&indices, t, cfg);
            let trend = trend3_flag(&indices, t);

            row.alert_spike = spike;
            row.alert_trend3 = trend;
            row.alert_level = AlertLevel::from_flags(spike, trend);
            out.push(row);
        }
    }

    log::debug!(
        "classified {} rows at threshold {:.2} (window {})",
        out.len(),
        cfg.spike_threshold,
        cfg.baseline_window
    );
    out
}

/// Rolling baseline for position `t`: mean of the non-null risk indices in
/// the up-to-`window` immediately preceding rows. `None` when fewer than
/// [`MIN_BASELINE_POINTS`] qualify.
fn baseline(indices: &[Option<f64>], t: usize, window: usize) -> Option<f64> {
    let start = t.saturating_sub(window);
    let points: Vec<f64> = indices[start..t].iter().filter_map(|v| *v).collect();
    if points.len() < MIN_BASELINE_POINTS {
        return None;
    }
    Some(points.iter().sum::<f64>() / points.len() as f64)
}

fn spike_flag(indices: &[Option<f64>], t: usize, cfg: &AlertConfig) -> bool {
    match (baseline(indices, t, cfg.baseline_window), indices[t]) {
        (Some(base), Some(current)) => current > base * (1.0 + cfg.spike_threshold),
        _ => false,
    }
}

/// True when positions `t-2`, `t-1`, `t` all carry a risk index and the
/// three values are strictly increasing. The first two months of any
/// area's history can never trend.
fn trend3_flag(indices: &[Option<f64>], t: usize) -> bool {
    if t < 2 {
        return false;
    }
    match (indices[t - 2], indices[t - 1], indices[t]) {
        (Some(a), Some(b), Some(c)) => c > b && b > a,
        _ => false,
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Alert counts over a classified panel, for end-of-run logging.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertSummary {
    pub total: usize,
    pub spike_count: usize,
    pub trend_count: usize,
    pub watch_count: usize,
    pub warning_count: usize,
}

pub fn summarize(rows: &[FeatureRow]) -> AlertSummary {
    let mut summary = AlertSummary {
        total: rows.len(),
        ..AlertSummary::default()
    };
    for row in rows {
        if row.alert_spike {
            summary.spike_count += 1;
        }
        if row.alert_trend3 {
            summary.trend_count += 1;
        }
        match row.alert_level {
            AlertLevel::Watch => summary.watch_count += 1,
            AlertLevel::Warning => summary.warning_count += 1,
            AlertLevel::None => {}
        }
    }
    summary
}

impl fmt::Display for AlertSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows | alert_spike={} | alert_trend3={} | watch={} | warning={}",
            self.total, self.spike_count, self.trend_count, self.watch_count, self.warning_count
        )
    }
}
