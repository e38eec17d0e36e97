// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Competition files are often sorted (by id, by plate, by
// label), so rows are shuffled before the validation rows are
// cut off the end.
//
// The RNG is seeded from the run config: one seed, one split,
// so two runs on the same data are directly comparable.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split into (train, validation).
///
/// `train_fraction` is clamped to [0, 1]; the training size is
/// rounded to the nearest row (3 rows at 0.8 → 2 train, 1 validation).
pub fn split_train_val<T>(mut samples: Vec<T>, train_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    samples.shuffle(&mut StdRng::seed_from_u64(seed));

    let total    = samples.len();
    let n_train  = ((total as f64) * train_fraction.clamp(0.0, 1.0)).round() as usize;
    let held_out = samples.split_off(n_train.min(total));

    tracing::debug!(
        "Split {} rows with seed {}: {} train, {} validation",
        total,
        seed,
        samples.len(),
        held_out.len(),
    );

    (samples, held_out)
}
