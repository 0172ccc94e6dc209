//! bikewatch-core: the derived-metrics pipeline behind the BikeWatch
//! borough-level bicycle-theft risk dashboard.
//!
//! The pipeline is a chain of pure functions over a month × area panel:
//!   1. `metrics`  — enrich raw counts/exposure into risk ratios and indices
//!   2. `alerts`   — classify every row with spike/trend flags and a level
//!   3. `panel`    — the immutable Panel Store and month Slice Selector
//!   4. `delta`    — month-to-month comparison rows
//!   5. `ranking`  — filtered, bounded, deterministically ordered top-N
//!   6. `view`     — one full-recompute entry point a host UI calls
//!
//! Everything is recomputed from scratch on every parameter change; no
//! state survives between invocations. Only the loading boundary
//! (`loader`) can fail — the computation layer is total over its input.

pub mod alerts;
pub mod delta;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod panel;
pub mod ranking;
pub mod types;
pub mod view;
