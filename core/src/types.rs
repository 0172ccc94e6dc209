//! Shared primitive types used across the entire panel pipeline.

/// A stable, unique identifier for one area (e.g. a Borough GSS code).
pub type AreaId = String;

/// A panel month key in `YYYY-MM` form.
/// Lexicographic order on these keys equals chronological order.
pub type MonthKey = String;
