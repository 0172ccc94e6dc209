//! Delta Calculator — month-to-month comparison rows.
//!
//! One [`DeltaRow`] per area appearing in either month's slice. Alert and
//! stability state are copied from the month-B row only; an area with data
//! only in month A gets the defaults (`none` / `false`). Delta rows are
//! ephemeral — recomputed on every (monthA, monthB, threshold) change.

use crate::{
    metrics::round4,
    model::{AlertLevel, DeltaRow, FeatureRow},
};
use std::collections::BTreeMap;

/// Compare `month_a` against `month_b` across the whole panel.
///
/// Comparing a month with itself, or with an empty month key, is a defined
/// no-op returning an empty sequence. Duplicate `area_id`s within one
/// month are a data-quality concern, not a fault: the last row wins.
/// Output is ascending by `area_id`.
pub fn compute_delta(rows: &[FeatureRow], month_a: &str, month_b: &str) -> Vec<DeltaRow> {
    if month_a == month_b || month_a.is_empty() || month_b.is_empty() {
        return Vec::new();
    }

    let side_a = month_lookup(rows, month_a);
    let side_b = month_lookup(rows, month_b);

    // Union of area ids from both sides; BTreeMap keys are already sorted,
    // so a merged BTreeMap of references gives deterministic order.
    let mut areas: BTreeMap<&str, ()> = BTreeMap::new();
    areas.extend(side_a.keys().map(|k| (*k, ())));
    areas.extend(side_b.keys().map(|k| (*k, ())));

    areas
        .into_keys()
        .map(|area_id| {
            let a = side_a.get(area_id).copied();
            let b = side_b.get(area_id).copied();

            let risk_index_a = a.and_then(|r| r.risk_index);
            let risk_index_b = b.and_then(|r| r.risk_index);
            let theft_count_a = a.and_then(|r| r.theft_count).unwrap_or(0);
            let theft_count_b = b.and_then(|r| r.theft_count).unwrap_or(0);

            let delta_risk_index = match (risk_index_a, risk_index_b) {
                (Some(ia), Some(ib)) => Some(round4(ib - ia)),
                _ => None,
            };

            // Display name prefers the B side, like every other B-leaning
            // field; exactly one side can be missing here, never both.
            let area_name = b
                .map(|r| r.area_name.clone())
                .or_else(|| a.map(|r| r.area_name.clone()))
                .unwrap_or_default();

            DeltaRow {
                area_id: area_id.to_string(),
                area_name,
                risk_index_a,
                risk_index_b,
                theft_count_a,
                theft_count_b,
                delta_risk_index,
                delta_count: theft_count_b as i64 - theft_count_a as i64,
                alert_level: b.map(|r| r.alert_level).unwrap_or(AlertLevel::None),
                stability_flag: b.map(|r| r.stability_flag).unwrap_or(false),
            }
        })
        .collect()
}

/// `area_id -> row` for one month; later rows overwrite earlier ones.
fn month_lookup<'a>(rows: &'a [FeatureRow], month: &str) -> BTreeMap<&'a str, &'a FeatureRow> {
    rows.iter()
        .filter(|r| r.month == month)
        .map(|r| (r.area_id.as_str(), r))
        .collect()
}
