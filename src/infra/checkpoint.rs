// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores everything `submit` needs to rebuild the
// trained model without seeing the training data again:
//
//   checkpoints/
//     model_epoch_1.mpk.gz   ← weights after epoch 1 (CompactRecorder)
//     model_epoch_2.mpk.gz
//     ...
//     latest_epoch.json      ← number of the last saved epoch
//     train_config.json      ← run hyperparameters
//     artifacts.json         ← layout, encoders, model architecture
//
// CompactRecorder serialises parameters to MessagePack and
// gzips them; loading fails if the architecture in
// artifacts.json does not match the weights.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::data::preprocessor::{FeatureEncoder, TargetEncoder};
use crate::domain::competition::Layout;
use crate::ml::model::{TabularMlp, TabularMlpConfig};

/// Everything fitted during training except the weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifacts {
    pub layout:   Layout,
    pub features: FeatureEncoder,
    pub targets:  TargetEncoder,
    pub model:    TabularMlpConfig,
}

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager rooted at `dir`.
    /// The directory is only created once something is saved.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", self.dir.display()))
    }

    /// Save model weights for a given epoch and move the latest pointer.
    pub fn save_model<B: Backend>(&self, model: &TabularMlp<B>, epoch: usize) -> Result<()> {
        self.ensure_dir()?;
        // The recorder appends its own extension
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the weights of the latest saved epoch into `model`.
    pub fn load_model<B: Backend>(
        &self,
        model:  TabularMlp<B>,
        device: &B::Device,
    ) -> Result<TabularMlp<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json("train_config.json", cfg)
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        self.read_json("train_config.json")
    }

    pub fn save_artifacts(&self, artifacts: &Artifacts) -> Result<()> {
        self.write_json("artifacts.json", artifacts)
    }

    pub fn load_artifacts(&self) -> Result<Artifacts> {
        self.read_json("artifacts.json")
    }

    /// Read latest_epoch.json; errors if training has not run yet.
    pub fn latest_epoch(&self) -> Result<usize> {
        self.read_json("latest_epoch.json")
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json).with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    fn read_json<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Make sure you have run 'train' before 'submit'.",
                path.display()
            )
        })?;
        serde_json::from_str(&json).with_context(|| format!("Corrupt '{}'", path.display()))
    }

    /// Rebuild the model described by `cfg` and load the latest weights.
    pub fn restore<B: Backend>(&self, cfg: &TabularMlpConfig, device: &B::Device) -> Result<TabularMlp<B>> {
        let model: TabularMlp<B> = cfg.init(device);
        self.load_model(model, device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_weights_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(tmp.path().join("ckpt"));
        let device = Default::default();
        let cfg = TabularMlpConfig::new(3, 2, vec![4]);
        let model: TabularMlp<NdArray> = cfg.init(&device);

        ckpt.save_model(&model, 1).unwrap();
        ckpt.save_model(&model, 2).unwrap();
        assert_eq!(ckpt.latest_epoch().unwrap(), 2);

        let restored: TabularMlp<NdArray> = ckpt.restore(&cfg, &device).unwrap();
        let x = Tensor::<NdArray, 2>::ones([1, 3], &device);
        let a = model.forward(x.clone()).into_data().to_vec::<f32>().unwrap();
        let b = restored.forward(x).into_data().to_vec::<f32>().unwrap();
        // CompactRecorder stores half precision
        for (p, q) in a.iter().zip(&b) {
            assert!((p - q).abs() < 1e-2);
        }
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(tmp.path());
        let err = ckpt.latest_epoch().unwrap_err();
        assert!(err.to_string().contains("latest_epoch.json"));
    }
}
