// ============================================================
// Layer 3 — Competition Layout
// ============================================================
// A competition identifier maps to a Layout: the task kind, the
// id column and the files the host ships. Two layouts are built
// in; any other competition supplies a layout.json next to its
// data (parsed by the loader, this type only describes it).
//
// Example layout.json:
//   {
//     "competition":   "my-playground",
//     "task":          "multi_class",
//     "id_column":     "id",
//     "train_file":    "train.csv",
//     "test_file":     "test.csv",
//     "target_columns": ["label"]
//   }

use serde::{Deserialize, Serialize};

use crate::domain::error::{LabError, LabResult};

/// What kind of prediction the host expects per identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// One label out of a closed set (e.g. Introvert / Extrovert)
    MultiClass,
    /// Independent probabilities per target column (e.g. MoA)
    MultiLabel,
    /// Continuous value(s)
    Regression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub competition: String,
    pub task:        TaskKind,
    pub id_column:   String,
    pub train_file:  String,
    pub test_file:   String,

    /// Separate file holding the training targets, joined by id.
    #[serde(default)]
    pub targets_file: Option<String>,

    /// Target columns. Empty means "every non-id column of targets_file".
    #[serde(default)]
    pub target_columns: Vec<String>,

    /// Sample submission whose header and row order we must reproduce.
    #[serde(default)]
    pub sample_submission: Option<String>,

    /// Columns never fed to the model (free text, leakage, ...).
    #[serde(default)]
    pub ignore_columns: Vec<String>,
}

pub const MOA: &str = "lish-moa";
pub const PERSONALITY: &str = "playground-series-s5e7";

impl Layout {
    /// Look up one of the built-in competition layouts.
    pub fn builtin(competition: &str) -> LabResult<Self> {
        match competition {
            MOA => Ok(Self {
                competition:       MOA.to_string(),
                task:              TaskKind::MultiLabel,
                id_column:         "sig_id".to_string(),
                train_file:        "train_features.csv".to_string(),
                test_file:         "test_features.csv".to_string(),
                targets_file:      Some("train_targets_scored.csv".to_string()),
                target_columns:    Vec::new(),
                sample_submission: Some("sample_submission.csv".to_string()),
                ignore_columns:    Vec::new(),
            }),
            PERSONALITY => Ok(Self {
                competition:       PERSONALITY.to_string(),
                task:              TaskKind::MultiClass,
                id_column:         "id".to_string(),
                train_file:        "train.csv".to_string(),
                test_file:         "test.csv".to_string(),
                targets_file:      None,
                target_columns:    vec!["Personality".to_string()],
                sample_submission: Some("sample_submission.csv".to_string()),
                ignore_columns:    Vec::new(),
            }),
            other => Err(LabError::UnknownCompetition(other.to_string())),
        }
    }

    /// Files that must exist before training can start.
    pub fn required_train_files(&self) -> Vec<&str> {
        let mut files = vec![self.train_file.as_str()];
        if let Some(t) = &self.targets_file {
            files.push(t.as_str());
        }
        files
    }

    /// Files that must exist before a submission can be produced.
    /// The sample submission is optional: when absent we fall back
    /// to the test file order and a derived header.
    pub fn required_test_files(&self) -> Vec<&str> {
        vec![self.test_file.as_str()]
    }

    /// Basic consistency checks for hand-written layout.json files.
    pub fn validate(&self) -> LabResult<()> {
        if self.id_column.trim().is_empty() {
            return Err(LabError::training("layout has an empty id_column"));
        }
        if self.targets_file.is_none() && self.target_columns.is_empty() {
            return Err(LabError::training(
                "layout needs target_columns when there is no targets_file",
            ));
        }
        if self.task == TaskKind::MultiClass && self.target_columns.len() > 1 {
            return Err(LabError::training("multi_class layouts take exactly one target column"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_layouts_are_valid() {
        for id in [MOA, PERSONALITY] {
            let layout = Layout::builtin(id).unwrap();
            assert_eq!(layout.competition, id);
            layout.validate().unwrap();
        }
    }

    #[test]
    fn test_unknown_competition() {
        let err = Layout::builtin("nope").unwrap_err();
        assert!(matches!(err, LabError::UnknownCompetition(name) if name == "nope"));
    }

    #[test]
    fn test_moa_requires_targets_file() {
        let layout = Layout::builtin(MOA).unwrap();
        assert_eq!(
            layout.required_train_files(),
            vec!["train_features.csv", "train_targets_scored.csv"]
        );
    }

    #[test]
    fn test_layout_json_defaults() {
        let json = r#"{
            "competition": "toy", "task": "regression", "id_column": "id",
            "train_file": "train.csv", "test_file": "test.csv",
            "target_columns": ["y"]
        }"#;
        let layout: Layout = serde_json::from_str(json).unwrap();
        assert_eq!(layout.task, TaskKind::Regression);
        assert!(layout.targets_file.is_none());
        assert!(layout.ignore_columns.is_empty());
        layout.validate().unwrap();
    }

    #[test]
    fn test_multi_class_single_target() {
        let mut layout = Layout::builtin(PERSONALITY).unwrap();
        layout.target_columns.push("Other".into());
        assert!(layout.validate().is_err());
    }
}
