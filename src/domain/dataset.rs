// ============================================================
// Layer 3 — Dataset Domain Type
// ============================================================
// The immutable table the loader hands to the rest of the run.
// Cells stay as strings here; turning them into numbers is the
// preprocessor's job (Layer 4), so the domain never has to know
// which columns are numeric.
//
// Created once per run, never mutated, dropped at process end.
// Fields are private so nothing downstream can edit the records.

use std::collections::HashSet;

use crate::domain::error::{LabError, LabResult};

/// Which half of the competition data a Dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    competition:   String,
    split:         Split,
    ids:           Vec<String>,
    feature_names: Vec<String>,
    features:      Vec<Vec<String>>,
    target_names:  Vec<String>,
    targets:       Option<Vec<Vec<String>>>,
}

impl Dataset {
    /// Assemble a Dataset, checking that every row has the declared
    /// width and every id is unique.
    pub fn new(
        competition:   impl Into<String>,
        split:         Split,
        ids:           Vec<String>,
        feature_names: Vec<String>,
        features:      Vec<Vec<String>>,
        target_names:  Vec<String>,
        targets:       Option<Vec<Vec<String>>>,
    ) -> LabResult<Self> {
        if ids.len() != features.len() {
            return Err(LabError::training(format!(
                "{} ids but {} feature rows",
                ids.len(),
                features.len()
            )));
        }
        if let Some(row) = features.iter().position(|r| r.len() != feature_names.len()) {
            return Err(LabError::training(format!(
                "feature row {row} has {} cells, expected {}",
                features[row].len(),
                feature_names.len()
            )));
        }
        if let Some(targets) = &targets {
            if targets.len() != ids.len() {
                return Err(LabError::training(format!(
                    "{} ids but {} target rows",
                    ids.len(),
                    targets.len()
                )));
            }
            if let Some(row) = targets.iter().position(|r| r.len() != target_names.len()) {
                return Err(LabError::training(format!(
                    "target row {row} has {} cells, expected {}",
                    targets[row].len(),
                    target_names.len()
                )));
            }
        }

        let mut seen = HashSet::with_capacity(ids.len());
        for id in &ids {
            if !seen.insert(id.as_str()) {
                return Err(LabError::training(format!("duplicate id '{id}'")));
            }
        }

        Ok(Self {
            competition: competition.into(),
            split,
            ids,
            feature_names,
            features,
            target_names,
            targets,
        })
    }

    pub fn competition(&self) -> &str { &self.competition }

    pub fn split(&self) -> Split { self.split }

    pub fn ids(&self) -> &[String] { &self.ids }

    pub fn feature_names(&self) -> &[String] { &self.feature_names }

    pub fn features(&self) -> &[Vec<String>] { &self.features }

    pub fn target_names(&self) -> &[String] { &self.target_names }

    /// None for test splits, which carry no labels.
    pub fn targets(&self) -> Option<&[Vec<String>]> {
        self.targets.as_deref()
    }

    pub fn len(&self) -> usize { self.ids.len() }

    pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    /// Index of a feature column by name.
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_valid_dataset() {
        let ds = Dataset::new(
            "toy",
            Split::Train,
            strings(&["a", "b"]),
            strings(&["x"]),
            vec![strings(&["1"]), strings(&["2"])],
            strings(&["y"]),
            Some(vec![strings(&["0"]), strings(&["1"])]),
        )
        .unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.feature_index("x"), Some(0));
        assert_eq!(ds.targets().unwrap()[1], strings(&["1"]));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = Dataset::new(
            "toy",
            Split::Test,
            strings(&["a", "a"]),
            strings(&["x"]),
            vec![strings(&["1"]), strings(&["2"])],
            Vec::new(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, LabError::Training(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Dataset::new(
            "toy",
            Split::Test,
            strings(&["a"]),
            strings(&["x", "z"]),
            vec![strings(&["1"])],
            Vec::new(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, LabError::Training(_)));
    }
}
