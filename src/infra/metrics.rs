// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records one row per epoch to checkpoints/metrics.csv so the
// learning curve can be plotted after the run.
//
//   epoch,train_loss,val_loss,metric,val_score
//   1,0.693100,0.690200,log_loss,0.690200
//   2,0.402100,0.415300,log_loss,0.415300
//
// How to read it:
//   - val_loss rising while train_loss falls → overfitting
//   - val_score is the competition metric for the task
//
// Appends across runs: the header is written only when the
// file is created.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::domain::error::LabResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:      usize,
    pub train_loss: f64,
    pub val_loss:   f64,
    pub metric:     String,
    pub val_score:  f64,
}

impl EpochMetrics {
    /// True if this epoch's validation loss beats `best_val_loss`.
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    pub fn new(dir: impl AsRef<Path>) -> LabResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let csv_path = dir.join("metrics.csv");

        if !csv_path.exists() {
            let mut w = csv::Writer::from_path(&csv_path)?;
            w.write_record(["epoch", "train_loss", "val_loss", "metric", "val_score"])?;
            w.flush()?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> LabResult<()> {
        let file = OpenOptions::new().append(true).open(&self.csv_path)?;
        let mut w = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        w.write_record([
            m.epoch.to_string(),
            format!("{:.6}", m.train_loss),
            format!("{:.6}", m.val_loss),
            m.metric.clone(),
            format!("{:.6}", m.val_score),
        ])?;
        w.flush()?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
