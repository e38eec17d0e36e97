// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::{anyhow, Result};
use burn::{prelude::*, tensor::activation};

use crate::data::batcher::rows_to_tensor;
use crate::domain::competition::TaskKind;
use crate::domain::traits::Predictor;
use crate::infra::checkpoint::{Artifacts, CheckpointManager};
use crate::ml::model::TabularMlp;

pub type InferBackend = burn::backend::NdArray;

// Rows per forward pass; keeps memory flat on large test files
const CHUNK_ROWS: usize = 1024;

pub struct Inferencer<B: Backend = InferBackend> {
    model:  TabularMlp<B>,
    task:   TaskKind,
    device: B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(model: TabularMlp<B>, task: TaskKind, device: B::Device) -> Self {
        Self { model, task, device }
    }

    /// Softmax for classes, sigmoid for independent targets,
    /// identity for regression.
    pub fn activate(task: TaskKind, logits: Tensor<B, 2>) -> Tensor<B, 2> {
        match task {
            TaskKind::MultiClass => activation::softmax(logits, 1),
            TaskKind::MultiLabel => activation::sigmoid(logits),
            TaskKind::Regression => logits,
        }
    }
}

impl Inferencer<InferBackend> {
    pub fn from_checkpoint(ckpt: &CheckpointManager, artifacts: &Artifacts) -> Result<Self> {
        let device = Default::default();
        let model = ckpt.restore::<InferBackend>(&artifacts.model, &device)?;
        tracing::info!("Model loaded from checkpoint");
        Ok(Self::new(model, artifacts.targets.task(), device))
    }
}

impl<B: Backend> Predictor for Inferencer<B> {
    fn predict(&self, features: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(features.len());
        for chunk in features.chunks(CHUNK_ROWS) {
            let x = rows_to_tensor::<B>(chunk, &self.device);
            let y = Self::activate(self.task, self.model.forward(x));
            let [rows, width] = y.dims();

            let flat = y
                .into_data()
                .convert::<f32>()
                .to_vec::<f32>()
                .map_err(|e| anyhow!("cannot read model output: {e:?}"))?;
            debug_assert_eq!(flat.len(), rows * width);
            out.extend(flat.chunks(width.max(1)).map(<[f32]>::to_vec));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::TabularMlpConfig;

    fn inferencer(task: TaskKind, outputs: usize) -> Inferencer {
        let device = Default::default();
        let model = TabularMlpConfig::new(3, outputs, vec![4]).init(&device);
        Inferencer::new(model, task, device)
    }

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let inf = inferencer(TaskKind::MultiClass, 3);
        let out = inf.predict(&[vec![0.1, -1.0, 2.0], vec![0.0, 0.0, 0.0]]).unwrap();
        assert_eq!(out.len(), 2);
        for row in out {
            assert_eq!(row.len(), 3);
            assert!((row.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_sigmoid_in_unit_interval() {
        let inf = inferencer(TaskKind::MultiLabel, 5);
        let rows: Vec<Vec<f32>> = (0..2100).map(|i| vec![i as f32 / 100.0, -1.0, 0.5]).collect();
        let out = inf.predict(&rows).unwrap();
        // Spans more than one chunk
        assert_eq!(out.len(), 2100);
        assert!(out.iter().flatten().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_empty_input() {
        let inf = inferencer(TaskKind::Regression, 1);
        assert!(inf.predict(&[]).unwrap().is_empty());
    }
}
