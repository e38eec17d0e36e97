// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Burn model code lives here; the data layer only owns the
// Dataset/Batcher glue.
//
//   model.rs      — TabularMlp baseline: (Linear → ReLU → Dropout)* → Linear
//
//   trainer.rs    — The training loop
//                   Forward pass, task loss, backward pass, Adam
//                   step, validation score and a checkpoint per epoch
//
//   inferencer.rs — Output activations (softmax / sigmoid / identity)
//                   behind the domain Predictor trait
//
//   scoring.rs    — Competition metrics: accuracy, log loss, RMSE
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

pub mod model;

/// Training loop with validation and checkpointing
pub mod trainer;

pub mod inferencer;

/// Validation metric per task kind
pub mod scoring;
