//! Ranking & Filter Engine — bounded, sorted top-N views over a slice.
//!
//! Works over either row shape (current-month [`FeatureRow`]s or
//! comparison [`DeltaRow`]s) through the [`MetricRow`] seam. Pipeline
//! order is fixed: drop null/NaN metrics, apply the alert filter, apply
//! the stability filter, stable-sort descending, truncate.

use crate::model::{AlertLevel, DeltaRow, FeatureRow};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_N: usize = 10;

/// Field a ranking is keyed on. Which metrics a row shape can answer
/// depends on the shape: asking a delta slice for `risk_index` (or a
/// current-month slice for `delta_risk_index`) yields an empty ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    RiskIndex,
    TheftCount,
    DeltaRiskIndex,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RiskIndex => "risk_index",
            Self::TheftCount => "theft_count",
            Self::DeltaRiskIndex => "delta_risk_index",
        }
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "risk_index" => Ok(Self::RiskIndex),
            "theft_count" => Ok(Self::TheftCount),
            "delta_risk_index" => Ok(Self::DeltaRiskIndex),
            other => Err(format!("unknown metric: {other}")),
        }
    }
}

/// Filter toggles, both off by default.
///
/// `stable_only` hides rows whose `stability_flag` is set — the toggle's
/// label speaks of *showing* reliable areas, but the shipped behavior is
/// to drop flagged rows, and that behavior is kept as-is.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RankFilters {
    pub alerts_only: bool,
    pub stable_only: bool,
}

/// What a row must expose to be rankable.
pub trait MetricRow {
    /// The ranked value, `None` when this row shape lacks the metric or
    /// the underlying field is null.
    fn metric(&self, metric: Metric) -> Option<f64>;
    fn alert_level(&self) -> AlertLevel;
    fn stability_flag(&self) -> bool;
}

impl MetricRow for FeatureRow {
    fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::RiskIndex => self.risk_index,
            Metric::TheftCount => self.theft_count.map(|c| c as f64),
            Metric::DeltaRiskIndex => None,
        }
    }

    fn alert_level(&self) -> AlertLevel {
        self.alert_level
    }

    fn stability_flag(&self) -> bool {
        self.stability_flag
    }
}

impl MetricRow for DeltaRow {
    fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::DeltaRiskIndex => self.delta_risk_index,
            Metric::RiskIndex | Metric::TheftCount => None,
        }
    }

    fn alert_level(&self) -> AlertLevel {
        self.alert_level
    }

    fn stability_flag(&self) -> bool {
        self.stability_flag
    }
}

/// Top `n` rows of `slice` by `metric`, descending.
///
/// The sort is stable: rows with equal metric values keep their relative
/// input order, so rankings are reproducible run to run.
pub fn rank_top_n<T: MetricRow + Clone>(
    slice: &[T],
    metric: Metric,
    filters: &RankFilters,
    n: usize,
) -> Vec<T> {
    let mut keyed: Vec<(f64, &T)> = slice
        .iter()
        .filter_map(|row| match row.metric(metric) {
            Some(value) if !value.is_nan() => Some((value, row)),
            _ => None,
        })
        .filter(|(_, row)| !filters.alerts_only || row.alert_level() != AlertLevel::None)
        .filter(|(_, row)| !filters.stable_only || !row.stability_flag())
        .collect();

    keyed.sort_by(|(a, _), (b, _)| b.total_cmp(a));
    keyed.truncate(n);
    keyed.into_iter().map(|(_, row)| row.clone()).collect()
}
