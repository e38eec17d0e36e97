// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The three seams of a run. The application layer only talks to
// these, so a different file format or model library slots in
// by implementing one trait.

use crate::domain::competition::Layout;
use crate::domain::dataset::{Dataset, Split};
use crate::domain::error::LabResult;
use crate::domain::submission::Submission;

// ─── DatasetSource ────────────────────────────────────────────────────────────
/// Anything that can produce a competition Dataset.
///
/// Implementations:
///   - CsvLoader → reads the host's CSV files from a local directory
pub trait DatasetSource {
    /// Read one split. Fails with `LabError::MissingData` when the
    /// layout's files are not on disk.
    fn load(&self, layout: &Layout, split: Split) -> LabResult<Dataset>;
}

// ─── Predictor ────────────────────────────────────────────────────────────────
/// A trained model that maps encoded feature rows to activated
/// outputs (class probabilities, target probabilities or values).
///
/// Implementations:
///   - Inferencer → burn MLP on the NdArray backend
pub trait Predictor {
    fn predict(&self, features: &[Vec<f32>]) -> anyhow::Result<Vec<Vec<f32>>>;
}

// ─── SubmissionSink ───────────────────────────────────────────────────────────
/// Where a finished Submission goes.
///
/// Implementations:
///   - CsvSubmissionWriter → the CSV file Kaggle uploads accept
pub trait SubmissionSink {
    fn write(&self, submission: &Submission) -> LabResult<()>;
}
