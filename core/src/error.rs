use thiserror::Error;

/// Everything that can fail in this crate fails at the loading boundary.
/// The computation pipeline itself (classify, slice, delta, rank, view)
/// is total over its documented input shape and never returns an error.
#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate panel row for area '{area_id}' in month {month}")]
    Duplicate { area_id: String, month: String },
}

pub type PanelResult<T> = Result<T, PanelError>;
