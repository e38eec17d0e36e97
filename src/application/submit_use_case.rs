// ============================================================
// Layer 2 — SubmitUseCase
// ============================================================
// Turns a trained model into the file the host scores:
//
//   Step 1: Load the test split            (Layer 4 - data)
//   Step 2: Encode features                (Layer 4 - data)
//   Step 3: Predict                        (Layer 5 - ml)
//   Step 4: Decode to submission strings   (Layer 4 - data)
//   Step 5: Order rows, check the id set   (Layer 3 - domain)
//   Step 6: Write the CSV                  (Layer 6 - infra)
//
// The model either comes from the checkpoint directory (`submit`)
// or straight from memory after training (`run`).

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::data::loader::{CsvLoader, SampleSubmission};
use crate::data::preprocessor::TargetEncoder;
use crate::domain::{
    competition::Layout,
    dataset::{Dataset, Split},
    error::{LabError, LabResult},
    submission::Submission,
    traits::{DatasetSource, Predictor, SubmissionSink},
};
use crate::infra::{
    checkpoint::{Artifacts, CheckpointManager},
    submission_writer::CsvSubmissionWriter,
};
use crate::ml::inferencer::Inferencer;

#[derive(Debug, Clone)]
pub struct SubmitConfig {
    pub data_dir:       PathBuf,
    pub checkpoint_dir: PathBuf,
    pub output:         PathBuf,
}

pub struct SubmitUseCase {
    config: SubmitConfig,
}

impl SubmitUseCase {
    pub fn new(config: SubmitConfig) -> Self {
        Self { config }
    }

    pub fn output(&self) -> &PathBuf {
        &self.config.output
    }

    /// Rebuild the model from the checkpoint directory and write the submission.
    pub fn execute(&self) -> Result<Submission> {
        let ckpt      = CheckpointManager::new(&self.config.checkpoint_dir);
        let artifacts = ckpt.load_artifacts()?;
        match ckpt.load_config() {
            Ok(run) => tracing::info!(
                "Checkpoint from a {}-epoch run on '{}' (seed {})",
                run.epochs,
                run.competition,
                run.seed
            ),
            Err(e) => tracing::warn!("No training config next to the checkpoint: {e:#}"),
        }
        let inferencer = Inferencer::from_checkpoint(&ckpt, &artifacts)?;
        self.execute_with(&artifacts, &inferencer)
    }

    /// Write the submission using an already available predictor.
    pub fn execute_with(&self, artifacts: &Artifacts, predictor: &dyn Predictor) -> Result<Submission> {
        let layout = &artifacts.layout;
        let loader = CsvLoader::new(&self.config.data_dir);

        // ── Step 1: Test split ────────────────────────────────────────────────
        let test = loader
            .load(layout, Split::Test)
            .with_context(|| format!("Cannot load test data for '{}'", layout.competition))?;
        tracing::info!("Loaded {} test rows", test.len());

        // ── Steps 2-4: Encode, predict, decode ────────────────────────────────
        let features = artifacts.features.transform(&test)?;
        let outputs  = predictor.predict(&features)?;
        if outputs.len() != test.len() {
            return Err(LabError::format(format!(
                "model produced {} predictions for {} test rows",
                outputs.len(),
                test.len()
            ))
            .into());
        }
        let decoded = artifacts.targets.decode(&outputs)?;

        // ── Step 5: Order + invariant check ───────────────────────────────────
        let sample     = loader.load_sample_submission(layout)?;
        let submission = assemble(layout, &artifacts.targets, &test, decoded, sample)?;

        // ── Step 6: Write ─────────────────────────────────────────────────────
        CsvSubmissionWriter::new(&self.config.output).write(&submission)?;
        Ok(submission)
    }
}

/// Build the Submission for `test` from decoded prediction rows.
///
/// With a sample submission its header and id order are reproduced
/// (columns are matched by name); otherwise the header is the id
/// column plus the encoder's prediction columns, in test order.
pub fn assemble(
    layout:  &Layout,
    targets: &TargetEncoder,
    test:    &Dataset,
    decoded: Vec<Vec<String>>,
    sample:  Option<SampleSubmission>,
) -> LabResult<Submission> {
    let columns = targets.prediction_columns();
    let predictions: Vec<(String, Vec<String>)> = test.ids().iter().cloned().zip(decoded).collect();

    let Some(sample) = sample else {
        let header = std::iter::once(layout.id_column.clone()).chain(columns).collect();
        return Submission::build(header, test.ids(), predictions);
    };

    if sample.header.first() != Some(&layout.id_column) {
        return Err(LabError::format(format!(
            "sample submission starts with {:?}, expected id column '{}'",
            sample.header.first(),
            layout.id_column
        )));
    }

    // Position of each sample column in the decoded rows
    let order: Vec<usize> = sample.header[1..]
        .iter()
        .map(|name| {
            columns.iter().position(|c| c == name).ok_or_else(|| {
                LabError::format(format!("sample submission column '{name}' is not predicted by the model"))
            })
        })
        .collect::<LabResult<_>>()?;

    let predictions = predictions
        .into_iter()
        .map(|(id, values)| {
            let reordered = order.iter().map(|&i| values[i].clone()).collect();
            (id, reordered)
        })
        .collect();

    tracing::debug!("Using sample submission order for {} ids", sample.ids.len());
    Submission::build(sample.header, &sample.ids, predictions)
}
