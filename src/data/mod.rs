// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the host's CSV files and tensor batches,
// plus the PDF outline → table of contents builder.
//
//   CSV files
//       │
//       ▼
//   CsvLoader         → reads files into an immutable Dataset
//       │
//       ▼
//   FeatureEncoder /  → strings to f32 rows (fitted on train)
//   TargetEncoder
//       │
//       ▼
//   split_train_val   → seeded shuffle + split
//       │
//       ▼
//   TabularDataset    → implements Burn's Dataset trait
//       │
//       ▼
//   TabularBatcher    → stacks samples into tensor batches
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads competition CSV files with the csv crate
pub mod loader;

/// Fits and applies feature / target encoders
pub mod preprocessor;

/// Implements Burn's Dataset trait for encoded rows
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded train/validation split
pub mod splitter;

/// Nested table of contents from PDF outline entries
pub mod toc;
