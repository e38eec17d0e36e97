// ============================================================
// Layer 3 — Submission Domain Type
// ============================================================
// The rows the competition host will score. Built once from the
// model's predictions and never mutated afterwards.
//
// Invariant enforced by `Submission::build`:
//   every expected identifier appears exactly once, in the
//   expected order, and no other identifier appears at all.

use std::collections::HashMap;

use crate::domain::error::{LabError, LabResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    header: Vec<String>,
    rows:   Vec<(String, Vec<String>)>,
}

impl Submission {
    /// Order `predictions` by `expected_ids` under `header`.
    ///
    /// `header[0]` is the id column; every prediction must carry
    /// exactly `header.len() - 1` values.
    pub fn build(
        header:       Vec<String>,
        expected_ids: &[String],
        predictions:  Vec<(String, Vec<String>)>,
    ) -> LabResult<Self> {
        if header.len() < 2 {
            return Err(LabError::format(format!(
                "header {header:?} needs an id column and at least one prediction column"
            )));
        }
        let width = header.len() - 1;

        let mut by_id: HashMap<String, Vec<String>> = HashMap::with_capacity(predictions.len());
        for (id, values) in predictions {
            if values.len() != width {
                return Err(LabError::format(format!(
                    "prediction for '{id}' has {} values, header expects {width}",
                    values.len()
                )));
            }
            if by_id.insert(id.clone(), values).is_some() {
                return Err(LabError::format(format!("duplicate prediction for id '{id}'")));
            }
        }

        let mut rows = Vec::with_capacity(expected_ids.len());
        for id in expected_ids {
            match by_id.remove(id) {
                Some(values) => rows.push((id.clone(), values)),
                None => {
                    // Either the id was never predicted, or it is listed twice
                    // in the expected order and the first occurrence took it.
                    return Err(LabError::format(format!(
                        "no prediction available for id '{id}'"
                    )));
                }
            }
        }

        if !by_id.is_empty() {
            let mut extra: Vec<_> = by_id.into_keys().collect();
            extra.sort();
            return Err(LabError::format(format!(
                "{} predictions for ids the host does not expect, e.g. '{}'",
                extra.len(),
                extra[0]
            )));
        }

        Ok(Self { header, rows })
    }

    pub fn header(&self) -> &[String] { &self.header }

    pub fn rows(&self) -> &[(String, Vec<String>)] { &self.rows }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(id, _)| id.as_str())
    }
}
