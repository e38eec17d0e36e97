// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
//   - Training runs on TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on InferBackend (NdArray),
//     with dropout off, for scoring the validation split
//   - The loss follows the task: cross-entropy, BCE with logits, MSE
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{anyhow, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    nn::loss::{BinaryCrossEntropyLossConfig, CrossEntropyLossConfig, MseLoss, Reduction},
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{rows_to_tensor, TabularBatcher},
    dataset::{TabularDataset, TabularSample},
    preprocessor::TargetEncoder,
};
use crate::domain::competition::TaskKind;
use crate::domain::error::LabError;
use crate::domain::traits::Predictor;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::inferencer::{InferBackend, Inferencer};
use crate::ml::model::{TabularMlp, TabularMlpConfig};
use crate::ml::scoring::{score, Score};

pub type TrainBackend = burn::backend::Autodiff<InferBackend>;

/// Result of a finished training run.
pub struct TrainedModel {
    pub model:      TabularMlp<InferBackend>,
    pub last_score: Option<Score>,
}

/// Loss for one batch of raw model outputs.
pub fn task_loss<B: Backend>(task: TaskKind, output: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
    match task {
        TaskKind::MultiClass => {
            // Class index travels as a float in column 0
            let classes = targets.flatten::<1>(0, 1).int();
            CrossEntropyLossConfig::new()
                .init(&output.device())
                .forward(output, classes)
        }
        TaskKind::MultiLabel => BinaryCrossEntropyLossConfig::new()
            .with_logits(true)
            .init(&output.device())
            .forward(output, targets.int()),
        TaskKind::Regression => MseLoss::new().forward(output, targets, Reduction::Mean),
    }
}

pub fn run_training(
    cfg:           &TrainConfig,
    model_cfg:     &TabularMlpConfig,
    targets:       &TargetEncoder,
    train_samples: Vec<TabularSample>,
    val_samples:   Vec<TabularSample>,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
) -> Result<TrainedModel> {
    if train_samples.is_empty() {
        return Err(LabError::training("no training rows left after the validation split").into());
    }
    if cfg.batch_size == 0 || cfg.epochs == 0 {
        return Err(LabError::training("batch_size and epochs must both be at least 1").into());
    }

    let device = burn::backend::ndarray::NdArrayDevice::default();
    TrainBackend::seed(cfg.seed);
    let task = targets.task();

    let mut model: TabularMlp<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {} → {:?} → {} ({:?})",
        model_cfg.input_dim,
        model_cfg.hidden_dims,
        model_cfg.output_dim,
        task
    );

    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    let train_batcher = TabularBatcher::<TrainBackend>::new(device);
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(TabularDataset::new(train_samples));

    let val_features: Vec<Vec<f32>> = val_samples.iter().map(|s| s.features.clone()).collect();
    let val_targets:  Vec<Vec<f32>> = val_samples.into_iter().map(|s| s.target).collect();

    let mut last_score    = None;
    let mut best_val_loss = f64::INFINITY;

    for epoch in 1..=cfg.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let output = model.forward(batch.features);
            let loss   = task_loss(task, output, batch.targets);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        let (val_loss, val_score) = if val_features.is_empty() {
            (f64::NAN, None)
        } else {
            let valid = model.valid();
            let inner_device = Default::default();
            let logits = valid.forward(rows_to_tensor::<InferBackend>(&val_features, &inner_device));
            let loss = task_loss(task, logits, rows_to_tensor::<InferBackend>(&val_targets, &inner_device))
                .into_scalar()
                .elem::<f64>();

            let outputs = Inferencer::new(valid, task, inner_device).predict(&val_features)?;
            (loss, Some(score(targets, &outputs, &val_targets)))
        };

        let (metric, value) = val_score.map_or(("none", f64::NAN), |s| (s.metric, s.value));
        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | {}={:.4}",
            epoch, cfg.epochs, avg_train_loss, val_loss, metric, value,
        );

        let epoch_metrics = EpochMetrics {
            epoch,
            train_loss: avg_train_loss,
            val_loss,
            metric: metric.to_string(),
            val_score: value,
        };
        metrics.log(&epoch_metrics)?;
        if epoch_metrics.is_improvement(best_val_loss) {
            best_val_loss = val_loss;
            tracing::info!("New best val_loss={:.4} at epoch {}", val_loss, epoch);
        }

        if !avg_train_loss.is_finite() {
            return Err(anyhow!("training diverged at epoch {epoch} (loss {avg_train_loss})"));
        }

        ckpt_manager.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
        last_score = val_score;
    }

    tracing::info!("Training complete! Metrics in '{}'", metrics.csv_path().display());
    Ok(TrainedModel { model: model.valid(), last_score })
}
