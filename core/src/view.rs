//! The full-recompute entry point.
//!
//! Whatever layer owns the UI state (sliders, month selectors, toggles)
//! calls [`recompute`] with the complete parameter set every time any of
//! them changes. Nothing is memoized and nothing leaks between calls —
//! a clean rebuild of classification, slices, deltas, and ranking is the
//! correctness guarantee, and panel sizes (tens of areas × tens of
//! months) make the rescan cost irrelevant.

use crate::{
    alerts::classify,
    delta::compute_delta,
    model::{DeltaRow, FeatureRow},
    panel::{select_month, Panel},
    ranking::{rank_top_n, Metric, RankFilters, DEFAULT_TOP_N},
    types::MonthKey,
};
use serde::{Deserialize, Serialize};

/// Everything one dashboard refresh depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewRequest {
    /// Spike threshold fraction; the UI exposes 0.10–1.00.
    pub threshold: f64,
    /// The displayed month (month B in comparison mode).
    pub month: MonthKey,
    /// When set, comparison mode: this is month A.
    #[serde(default)]
    pub compare_with: Option<MonthKey>,
    pub metric: Metric,
    #[serde(default)]
    pub filters: RankFilters,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// The ranked subset, in whichever row shape the active mode produces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "view", content = "rows", rename_all = "snake_case")]
pub enum RankedRows {
    Current(Vec<FeatureRow>),
    Comparison(Vec<DeltaRow>),
}

impl RankedRows {
    pub fn len(&self) -> usize {
        match self {
            Self::Current(rows) => rows.len(),
            Self::Comparison(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One refresh worth of derived data, ready for the renderers: the fully
/// classified panel (choropleth + per-area trend series), the current
/// month's slice, comparison deltas (empty outside comparison mode), and
/// the ranked top-N.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub threshold: f64,
    pub classified: Vec<FeatureRow>,
    pub current: Vec<FeatureRow>,
    pub deltas: Vec<DeltaRow>,
    pub ranked: RankedRows,
}

/// Rebuild the whole view from the immutable panel. Pure; owns no state.
pub fn recompute(panel: &Panel, req: &ViewRequest) -> DashboardView {
    let classified = classify(panel.rows(), req.threshold);
    let current = select_month(&classified, &req.month);

    let (deltas, ranked) = match &req.compare_with {
        Some(month_a) => {
            let deltas = compute_delta(&classified, month_a, &req.month);
            let ranked = rank_top_n(&deltas, req.metric, &req.filters, req.top_n);
            (deltas, RankedRows::Comparison(ranked))
        }
        None => {
            let ranked = rank_top_n(&current, req.metric, &req.filters, req.top_n);
            (Vec::new(), RankedRows::Current(ranked))
        }
    };

    log::debug!(
        "recompute: month={} compare={:?} metric={} -> {} current rows, {} deltas, {} ranked",
        req.month,
        req.compare_with,
        req.metric.name(),
        current.len(),
        deltas.len(),
        ranked.len()
    );

    DashboardView {
        threshold: req.threshold,
        classified,
        current,
        deltas,
        ranked,
    }
}
