// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe a competition run:
//
//   competition.rs — which files and columns a competition uses
//   dataset.rs     — the immutable table produced by the loader
//   submission.rs  — the ordered (id, prediction) rows we hand in
//   error.rs       — the typed failures every layer can raise
//   traits.rs      — seams between loader, model and writer
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O (layout.json parsing lives in the loader)
//   - Only structs, enums and traits

pub mod competition;
pub mod dataset;
pub mod error;
pub mod submission;
pub mod traits;
