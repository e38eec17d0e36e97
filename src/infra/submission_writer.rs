use std::fs;
use std::path::PathBuf;

use crate::domain::error::LabResult;
use crate::domain::submission::Submission;
use crate::domain::traits::SubmissionSink;

/// Writes a Submission as the CSV file Kaggle accepts: header row
/// first, then one row per identifier in submission order.
pub struct CsvSubmissionWriter {
    path: PathBuf,
}

impl CsvSubmissionWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SubmissionSink for CsvSubmissionWriter {
    fn write(&self, submission: &Submission) -> LabResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut w = csv::Writer::from_path(&self.path)?;
        w.write_record(submission.header())?;
        for (id, values) in submission.rows() {
            w.write_record(std::iter::once(id).chain(values))?;
        }
        w.flush()?;

        tracing::info!("Wrote {} rows to '{}'", submission.len(), self.path.display());
        Ok(())
    }
}
