// ============================================================
// Layer 3 — Domain Errors
// ============================================================
// Every failure a run can surface to the user. None of them are
// retried: the user fixes the input and runs the command again.
//
//   MissingData  → download the dataset from the competition page
//   Training     → the input tables have the wrong shape
//   Format       → the submission cannot satisfy the host's schema
//
// The application layer wraps these in anyhow, so callers that
// care about the kind use `err.downcast_ref::<LabError>()`.

use std::path::PathBuf;
use thiserror::Error;

pub type LabResult<T> = Result<T, LabError>;

#[derive(Debug, Error)]
pub enum LabError {
    /// Expected dataset files are absent (datasets are never committed).
    #[error(
        "dataset for '{competition}' is incomplete: missing {missing:?} under '{}'. \
         Download it from the competition page first.",
        .dir.display()
    )]
    MissingData {
        competition: String,
        dir:         PathBuf,
        missing:     Vec<String>,
    },

    /// No built-in layout and no layout.json next to the data.
    #[error("unknown competition '{0}': add a layout.json to the dataset directory")]
    UnknownCompetition(String),

    /// Malformed input shapes: missing columns, ragged targets, empty tables.
    #[error("cannot train on this input: {0}")]
    Training(String),

    /// The submission cannot be made to match the expected schema.
    #[error("submission format error: {0}")]
    Format(String),

    #[error("cannot read PDF '{}': {reason}", .path.display())]
    Pdf { path: PathBuf, reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LabError {
    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }
}
