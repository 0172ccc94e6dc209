//! Risk-metrics enrichment — from raw (theft_count, exposure) cells to the
//! derived ratio columns the rest of the pipeline consumes.
//!
//! Per row:
//!   `risk_ratio`      = theft_count / exposure (None unless exposure > 0)
//!   `city_mean_ratio` = mean risk_ratio across exposure-valid areas that
//!                       month, written to every row of the month
//!   `risk_index`      = risk_ratio / city_mean_ratio (city baseline = 1.0)
//!   `stability_flag`  = exposure below the stability floor (interpret the
//!                       ratio with caution)
//!
//! Counts, names and months pass through untouched.

use crate::{model::FeatureRow, types::MonthKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Constants ────────────────────────────────────────────────────────────────

/// Areas with fewer risk-bearing locations than this get `stability_flag`.
pub const DEFAULT_STABILITY_MIN_EXPOSURE: f64 = 10.0;

// ── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub stability_min_exposure: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            stability_min_exposure: DEFAULT_STABILITY_MIN_EXPOSURE,
        }
    }
}

// ── Enrichment ───────────────────────────────────────────────────────────────

/// Recompute the derived metric columns for every row.
///
/// Pure; output order is ascending (`area_id`, `month`), matching the
/// classifier. A month with no exposure-valid rows gets a `None` city mean
/// everywhere, and consequently `None` risk indices.
pub fn enrich(rows: &[FeatureRow], cfg: &MetricsConfig) -> Vec<FeatureRow> {
    // Per-month mean of risk_ratio over exposure-valid rows.
    let mut sums: BTreeMap<MonthKey, (f64, usize)> = BTreeMap::new();
    for row in rows {
        if let Some(ratio) = raw_ratio(row) {
            let entry = sums.entry(row.month.clone()).or_insert((0.0, 0));
            entry.0 += ratio;
            entry.1 += 1;
        }
    }
    let city_means: BTreeMap<MonthKey, f64> = sums
        .into_iter()
        .map(|(month, (sum, count))| (month, sum / count as f64))
        .collect();

    let mut out: Vec<FeatureRow> = rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            row.risk_ratio = raw_ratio(&row);
            row.city_mean_ratio = city_means.get(&row.month).copied();
            row.risk_index = match (row.risk_ratio, row.city_mean_ratio) {
                (Some(ratio), Some(mean)) if mean > 0.0 => Some(ratio / mean),
                _ => None,
            };
            row.stability_flag = match row.exposure {
                Some(e) => e < cfg.stability_min_exposure,
                // No exposure figure at all: certainly not enough sample.
                None => true,
            };
            row
        })
        .collect();

    out.sort_by(|a, b| (&a.area_id, &a.month).cmp(&(&b.area_id, &b.month)));

    let no_mean = out.iter().filter(|r| r.city_mean_ratio.is_none()).count();
    if no_mean > 0 {
        log::warn!("{no_mean} rows fall in months with no exposure-valid area");
    }
    out
}

/// `theft_count / exposure`, defined only when exposure is present and
/// strictly positive and the count is present.
fn raw_ratio(row: &FeatureRow) -> Option<f64> {
    if !row.has_valid_exposure() {
        return None;
    }
    let exposure = row.exposure?;
    let count = row.theft_count?;
    Some(count as f64 / exposure)
}

/// Round to 4 decimal places, half away from zero. The exported panel
/// carries 4-decimal floats; delta rows follow the same convention.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
