// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File formats that don't belong in any business layer:
//
//   checkpoint.rs        — Model weights via Burn's CompactRecorder,
//                          plus train_config.json and artifacts.json
//                          so `submit` can rebuild the model.
//
//   metrics.rs           — One CSV row per epoch for later plotting.
//
//   submission_writer.rs — The submission CSV the host scores.
//
//   pdf_outline.rs       — Reads PDF bookmarks with lopdf and
//                          resolves their destinations to pages.
//
// Reference: Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Submission CSV writer
pub mod submission_writer;

/// PDF outline reader
pub mod pdf_outline;
