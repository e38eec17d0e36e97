// ============================================================
// Layer 5 — Validation Scoring
// ============================================================
// The competition metric per task, computed on activated model
// outputs against the encoded validation targets:
//
//   multi_class  → accuracy
//   multi_label  → mean column-wise log loss (clipped at 1e-15),
//                  the metric the MoA leaderboard used
//   regression   → RMSE in the original target units

use serde::Serialize;

use crate::data::preprocessor::{argmax, TargetEncoder};

const EPS: f64 = 1e-15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    pub metric: &'static str,
    pub value:  f64,
}

/// Score `outputs` against `targets`. Returns NaN when there is
/// nothing to score (e.g. a validation split of zero rows).
pub fn score(encoder: &TargetEncoder, outputs: &[Vec<f32>], targets: &[Vec<f32>]) -> Score {
    let n = outputs.len().min(targets.len());
    match encoder {
        TargetEncoder::Classes { .. } => {
            let correct = outputs
                .iter()
                .zip(targets)
                .filter(|(out, t)| argmax(out) == t[0] as usize)
                .count();
            Score { metric: "accuracy", value: ratio(correct as f64, n) }
        }
        TargetEncoder::Binary { .. } => {
            let mut total = 0.0f64;
            let mut count = 0usize;
            for (out, t) in outputs.iter().zip(targets) {
                for (&p, &y) in out.iter().zip(t) {
                    let p = (p as f64).clamp(EPS, 1.0 - EPS);
                    let y = y as f64;
                    total -= y * p.ln() + (1.0 - y) * (1.0 - p).ln();
                    count += 1;
                }
            }
            Score { metric: "log_loss", value: ratio(total, count) }
        }
        TargetEncoder::Continuous { std, .. } => {
            let mut total = 0.0f64;
            let mut count = 0usize;
            for (out, t) in outputs.iter().zip(targets) {
                for (j, (&p, &y)) in out.iter().zip(t).enumerate() {
                    // Both sides share the mean, so only the scale matters
                    let d = ((p - y) * std[j]) as f64;
                    total += d * d;
                    count += 1;
                }
            }
            Score { metric: "rmse", value: ratio(total, count).sqrt() }
        }
    }
}

fn ratio(num: f64, den: usize) -> f64 {
    if den == 0 { f64::NAN } else { num / den as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        let enc = TargetEncoder::Classes { column: "y".into(), classes: vec!["a".into(), "b".into()] };
        let s = score(
            &enc,
            &[vec![0.9, 0.1], vec![0.2, 0.8], vec![0.6, 0.4]],
            &[vec![0.0], vec![1.0], vec![1.0]],
        );
        assert_eq!(s.metric, "accuracy");
        assert!((s.value - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_log_loss_perfect_and_clipped() {
        let enc = TargetEncoder::Binary { columns: vec!["t".into()] };
        let perfect = score(&enc, &[vec![1.0], vec![0.0]], &[vec![1.0], vec![0.0]]);
        assert!(perfect.value < 1e-12);

        // A confident miss is bounded by the clipping
        let worst = score(&enc, &[vec![0.0]], &[vec![1.0]]);
        assert!((worst.value - (-(EPS.ln()))).abs() < 1e-6);
    }

    #[test]
    fn test_log_loss_at_half() {
        let enc = TargetEncoder::Binary { columns: vec!["t1".into(), "t2".into()] };
        let s = score(&enc, &[vec![0.5, 0.5]], &[vec![1.0, 0.0]]);
        assert!((s.value - std::f64::consts::LN_2).abs() < 1e-6);
    }

    #[test]
    fn test_rmse_uses_original_scale() {
        let enc = TargetEncoder::Continuous {
            columns: vec!["y".into()],
            mean:    vec![100.0],
            std:     vec![10.0],
            min:     vec![0.0],
            max:     vec![200.0],
        };
        // 0.5 standardized units apart → 5 original units
        let s = score(&enc, &[vec![0.5], vec![-0.5]], &[vec![0.0], vec![0.0]]);
        assert!((s.value - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_is_nan() {
        let enc = TargetEncoder::Binary { columns: vec!["t".into()] };
        assert!(score(&enc, &[], &[]).value.is_nan());
    }
}
