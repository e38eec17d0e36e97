// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Resolve the competition layout   (Layer 4 - data)
//   Step 2: Load the training split          (Layer 4 - data)
//   Step 3: Fit feature / target encoders    (Layer 4 - data)
//   Step 4: Encode rows into samples         (Layer 4 - data)
//   Step 5: Split train/validation           (Layer 4 - data)
//   Step 6: Save config + artifacts          (Layer 6 - infra)
//   Step 7: Run training loop                (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::TabularSample,
    loader::CsvLoader,
    preprocessor::{FeatureEncoder, TargetEncoder},
    splitter::split_train_val,
};
use crate::domain::{
    dataset::Split,
    error::{LabError, LabResult},
    traits::DatasetSource,
};
use crate::infra::{
    checkpoint::{Artifacts, CheckpointManager},
    metrics::MetricsLogger,
};
use crate::ml::{
    inferencer::InferBackend,
    model::{TabularMlp, TabularMlpConfig},
    scoring::Score,
    trainer::run_training,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Saved as train_config.json so a later `submit` knows what was run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub competition:    String,
    pub data_dir:       String,
    pub checkpoint_dir: String,
    pub hidden_dims:    Vec<usize>,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub dropout:        f64,
    pub val_fraction:   f64,
    pub seed:           u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            competition:    crate::domain::competition::PERSONALITY.to_string(),
            data_dir:       "data".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            hidden_dims:    vec![128, 64],
            batch_size:     64,
            epochs:         10,
            lr:             1e-3,
            dropout:        0.2,
            val_fraction:   0.2,
            seed:           42,
        }
    }
}

impl TrainConfig {
    /// Reject hyperparameters burn would panic on or silently misuse.
    pub fn validate(&self) -> LabResult<()> {
        if self.batch_size == 0 || self.epochs == 0 {
            return Err(LabError::training("batch_size and epochs must both be at least 1"));
        }
        if self.hidden_dims.contains(&0) {
            return Err(LabError::training(format!("hidden_dims {:?} contains a zero width", self.hidden_dims)));
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(LabError::training(format!("lr must be a positive number, got {}", self.lr)));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(LabError::training(format!("dropout must be in [0, 1), got {}", self.dropout)));
        }
        if !(0.0..1.0).contains(&self.val_fraction) {
            return Err(LabError::training(format!(
                "val_fraction must be in [0, 1), got {}",
                self.val_fraction
            )));
        }
        Ok(())
    }
}

/// What a finished training run hands to the submission step.
pub struct TrainOutcome {
    pub model:      TabularMlp<InferBackend>,
    pub artifacts:  Artifacts,
    pub last_score: Option<Score>,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainOutcome> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Layout ────────────────────────────────────────────────────
        let loader = CsvLoader::new(&cfg.data_dir);
        let layout = loader.resolve_layout(&cfg.competition)?;
        tracing::info!("Competition '{}' ({:?})", layout.competition, layout.task);

        // ── Step 2: Training split ────────────────────────────────────────────
        let dataset = loader
            .load(&layout, Split::Train)
            .with_context(|| format!("Cannot load training data for '{}'", layout.competition))?;
        if dataset.is_empty() {
            return Err(LabError::training(format!("'{}' has no rows", layout.train_file)).into());
        }
        tracing::info!(
            "Loaded {} {:?} rows for '{}', {} feature columns, {} target columns",
            dataset.len(),
            dataset.split(),
            dataset.competition(),
            dataset.feature_names().len(),
            dataset.target_names().len()
        );

        // ── Step 3: Encoders ──────────────────────────────────────────────────
        // Fitted on the full training split, reused unchanged for test
        let features = FeatureEncoder::fit(&dataset, &layout.ignore_columns)?;
        let targets  = TargetEncoder::fit(layout.task, &dataset)?;
        tracing::info!(
            "Encoded input width {}, model outputs {}",
            features.width(),
            targets.output_dim()
        );

        // ── Step 4: Samples ───────────────────────────────────────────────────
        let samples = TabularSample::zip(features.transform(&dataset)?, targets.encode(&dataset)?);

        // ── Step 5: Train / validation split ──────────────────────────────────
        let (train_samples, val_samples) = split_train_val(samples, 1.0 - cfg.val_fraction, cfg.seed);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len()
        );

        // ── Step 6: Persist everything submit needs ───────────────────────────
        let model_cfg = TabularMlpConfig::new(features.width(), targets.output_dim(), cfg.hidden_dims.clone())
            .with_dropout(cfg.dropout);
        let artifacts = Artifacts { layout, features, targets, model: model_cfg };

        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;
        ckpt_manager.save_artifacts(&artifacts)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        // ── Step 7: Training loop (Layer 5) ───────────────────────────────────
        let trained = run_training(
            cfg,
            &artifacts.model,
            &artifacts.targets,
            train_samples,
            val_samples,
            &ckpt_manager,
            &metrics,
        )?;

        Ok(TrainOutcome {
            model:      trained.model,
            artifacts,
            last_score: trained.last_score,
        })
    }
}
