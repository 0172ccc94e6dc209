//! The panel data model.
//!
//! A panel is a flat list of [`FeatureRow`]s, one per (area, month) cell.
//! Rows arrive from the data-preparation stage with the three alert fields
//! absent or stale; the classifier in `alerts.rs` is the source of truth
//! for those and never touches anything else.

use crate::types::{AreaId, MonthKey};
use serde::{Deserialize, Serialize};

/// Combined alert classification for one (area, month) cell.
///
/// Ordering is severity order: `None < Watch < Warning`.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    #[default]
    None,
    Watch,
    Warning,
}

impl AlertLevel {
    /// Derive the level from the two alert flags:
    /// neither → none, exactly one → watch, both → warning.
    pub fn from_flags(spike: bool, trend: bool) -> Self {
        match (spike, trend) {
            (false, false) => Self::None,
            (true, true) => Self::Warning,
            _ => Self::Watch,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Watch => "watch",
            Self::Warning => "warning",
        }
    }
}

/// One area in one month.
///
/// Numeric fields are `None` when the upstream data could not produce them
/// (zero or missing exposure, no valid city mean). Missing values are
/// propagated through the pipeline, never silently defaulted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureRow {
    pub area_id: AreaId,
    pub area_name: String,
    /// `YYYY-MM`; lexicographic order equals chronological order.
    pub month: MonthKey,
    pub theft_count: Option<u32>,
    /// Count of risk-bearing locations (bicycle parking features).
    pub exposure: Option<f64>,
    /// `theft_count / exposure`; `None` when exposure is zero or missing.
    pub risk_ratio: Option<f64>,
    /// Mean `risk_ratio` across all exposure-valid areas that month.
    pub city_mean_ratio: Option<f64>,
    /// `risk_ratio / city_mean_ratio`; city baseline = 1.0.
    pub risk_index: Option<f64>,
    /// True when exposure is too low for the ratio to be trusted.
    #[serde(default)]
    pub stability_flag: bool,
    /// Derived: risk index above the rolling baseline by more than the
    /// configured threshold fraction.
    #[serde(default)]
    pub alert_spike: bool,
    /// Derived: risk index strictly rising over three consecutive months.
    #[serde(default)]
    pub alert_trend3: bool,
    /// Derived from the two flags.
    #[serde(default)]
    pub alert_level: AlertLevel,
}

impl FeatureRow {
    /// Exposure usable as a denominator: present and strictly positive.
    pub fn has_valid_exposure(&self) -> bool {
        matches!(self.exposure, Some(e) if e > 0.0)
    }
}

/// One area, comparing month A to month B.
///
/// Ephemeral: recomputed on every (monthA, monthB, threshold) change and
/// never persisted. Alert and stability state come from the B side only;
/// an area with data only in month A gets the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeltaRow {
    pub area_id: AreaId,
    pub area_name: String,
    pub risk_index_a: Option<f64>,
    pub risk_index_b: Option<f64>,
    pub theft_count_a: u32,
    pub theft_count_b: u32,
    /// `risk_index_b − risk_index_a`, rounded to 4 decimals;
    /// `None` when either side's index is missing.
    pub delta_risk_index: Option<f64>,
    /// `theft_count_b − theft_count_a`, missing counts treated as 0.
    pub delta_count: i64,
    pub alert_level: AlertLevel,
    pub stability_flag: bool,
}
