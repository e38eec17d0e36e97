// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers into one linear run each:
// load → train → submit, or PDF → table of contents.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - No direct CSV/PDF parsing (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Errors leave this layer as anyhow::Error; the domain error
// kind stays reachable through downcast_ref::<LabError>().

// Load, encode, split, train, checkpoint
pub mod train_use_case;

// Test split → predictions → ordered submission CSV
pub mod submit_use_case;

// Train then submit with the in-memory model
pub mod run_use_case;

// PDF outline → nested JSON table of contents
pub mod toc_use_case;
