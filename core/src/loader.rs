//! Loading of the three static documents the data-preparation stage
//! exports: `features.json` (the raw panel), `meta.json` (month list,
//! area index, threshold defaults), and `areas.geojson` (boundaries —
//! geometry is carried opaquely and never interpreted here).
//!
//! This is the crate's only fallible layer and the place where the
//! "(area_id, month) unique" precondition is enforced; past this
//! boundary the pipeline assumes validated data.

use crate::{
    error::{PanelError, PanelResult},
    model::FeatureRow,
    panel::Panel,
    types::{AreaId, MonthKey},
};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

// ── Document shapes ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaRef {
    pub id: AreaId,
    pub name: String,
}

/// Threshold defaults chosen by the data-preparation stage; these seed
/// `AlertConfig` / `MetricsConfig` unless overridden downstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaThresholds {
    pub stability_min_exposure: f64,
    pub spike_threshold: f64,
    pub baseline_window_months: usize,
}

impl Default for MetaThresholds {
    fn default() -> Self {
        Self {
            stability_min_exposure: crate::metrics::DEFAULT_STABILITY_MIN_EXPOSURE,
            spike_threshold: crate::alerts::DEFAULT_SPIKE_THRESHOLD,
            baseline_window_months: crate::alerts::DEFAULT_BASELINE_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelMeta {
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    /// Ordered months covering the panel range, oldest first.
    #[serde(default)]
    pub months: Vec<MonthKey>,
    #[serde(default)]
    pub areas: Vec<AreaRef>,
    #[serde(default)]
    pub thresholds: MetaThresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaProperties {
    pub area_id: AreaId,
    pub area_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaFeature {
    pub properties: AreaProperties,
    /// GeoJSON geometry, kept opaque for the map renderer.
    pub geometry: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaCollection {
    pub features: Vec<AreaFeature>,
}

// ── Loading ──────────────────────────────────────────────────────────────────

fn read_json<T: DeserializeOwned>(path: &Path) -> PanelResult<T> {
    let text = fs::read_to_string(path).map_err(|source| PanelError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| PanelError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_features(path: &Path) -> PanelResult<Vec<FeatureRow>> {
    read_json(path)
}

pub fn load_meta(path: &Path) -> PanelResult<PanelMeta> {
    read_json(path)
}

pub fn load_areas(path: &Path) -> PanelResult<AreaCollection> {
    read_json(path)
}

/// Load `features.json` + `meta.json` from `data_dir` into a [`Panel`].
///
/// Rows are sorted by (`area_id`, `month`) and checked for duplicate
/// cells. When meta carries no month list the ordered distinct months
/// are derived from the rows instead.
pub fn load_panel(data_dir: &Path) -> PanelResult<(Panel, PanelMeta)> {
    let mut rows = load_features(&data_dir.join("features.json"))?;
    let meta = load_meta(&data_dir.join("meta.json"))?;

    rows.sort_by(|a, b| (&a.area_id, &a.month).cmp(&(&b.area_id, &b.month)));
    for pair in rows.windows(2) {
        if pair[0].area_id == pair[1].area_id && pair[0].month == pair[1].month {
            return Err(PanelError::Duplicate {
                area_id: pair[0].area_id.clone(),
                month: pair[0].month.clone(),
            });
        }
    }

    let panel = if meta.months.is_empty() {
        log::warn!(
            "{} lists no months; deriving the month axis from the rows",
            data_dir.join("meta.json").display()
        );
        Panel::from_rows(rows)
    } else {
        let known: BTreeSet<&str> = meta.months.iter().map(|m| m.as_str()).collect();
        let stray: BTreeSet<&str> = rows
            .iter()
            .map(|r| r.month.as_str())
            .filter(|m| !known.contains(m))
            .collect();
        if !stray.is_empty() {
            log::warn!(
                "{} months appear in rows but not in meta: {:?}",
                stray.len(),
                stray
            );
        }
        Panel::new(rows, meta.months.clone())
    };

    Ok((panel, meta))
}

// ── Tests ────────────────────────────────────────────────────────────────────
