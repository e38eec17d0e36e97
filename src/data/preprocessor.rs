// ============================================================
// Layer 4 — Column Encoders
// ============================================================
// Turns the loader's string cells into the f32 rows the model
// consumes, and the model's outputs back into submission cells.
//
// FeatureEncoder (fitted on the training split only):
//   numeric column      → z-score; empty / unparsable → 0.0 (the mean)
//   categorical column  → one-hot over the levels seen in training;
//                         unseen levels encode as all zeros
//
// TargetEncoder, one shape per task:
//   Classes    → class index (vocabulary sorted for stable ids)
//   Binary     → 0/1 per target column, predictions are probabilities
//   Continuous → z-scored for training; predictions are mapped back
//                and clamped to the range seen in training
//
// Both encoders are saved next to the checkpoint so `submit`
// reproduces the exact training-time transformation.

use serde::{Deserialize, Serialize};

use crate::domain::competition::TaskKind;
use crate::domain::dataset::Dataset;
use crate::domain::error::{LabError, LabResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnEncoding {
    Numeric { name: String, mean: f32, std: f32 },
    Categorical { name: String, levels: Vec<String> },
}

impl ColumnEncoding {
    pub fn name(&self) -> &str {
        match self {
            Self::Numeric { name, .. } | Self::Categorical { name, .. } => name,
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Self::Numeric { .. } => 1,
            Self::Categorical { levels, .. } => levels.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    columns: Vec<ColumnEncoding>,
}

/// Mean and standard deviation, with std forced to 1 for constant columns.
fn mean_std(values: &[f64]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 1.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    (mean as f32, if std > 1e-12 { std as f32 } else { 1.0 })
}

fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl FeatureEncoder {
    /// Learn one encoding per feature column not listed in `ignore`.
    pub fn fit(dataset: &Dataset, ignore: &[String]) -> LabResult<Self> {
        let mut columns = Vec::new();

        for (idx, name) in dataset.feature_names().iter().enumerate() {
            if ignore.contains(name) {
                tracing::debug!("Ignoring column '{}'", name);
                continue;
            }
            let cells: Vec<&str> = dataset.features().iter().map(|r| r[idx].as_str()).collect();

            // A column is numeric when every non-empty cell parses
            let non_empty: Vec<&str> =
                cells.iter().copied().filter(|c| !c.trim().is_empty()).collect();
            let parsed: Vec<f64> = non_empty.iter().filter_map(|c| parse_cell(c)).collect();

            if !non_empty.is_empty() && parsed.len() == non_empty.len() {
                let (mean, std) = mean_std(&parsed);
                columns.push(ColumnEncoding::Numeric { name: name.clone(), mean, std });
            } else {
                let mut levels: Vec<String> = cells.iter().map(|c| c.trim().to_string()).collect();
                levels.sort();
                levels.dedup();
                columns.push(ColumnEncoding::Categorical { name: name.clone(), levels });
            }
        }

        let encoder = Self { columns };
        if encoder.width() == 0 {
            return Err(LabError::training("no usable feature columns"));
        }
        tracing::info!(
            "Feature encoder: {} columns → {} inputs",
            encoder.columns.len(),
            encoder.width()
        );
        Ok(encoder)
    }

    /// Total model input width.
    pub fn width(&self) -> usize {
        self.columns.iter().map(ColumnEncoding::width).sum()
    }

    /// Encode every row of `dataset`. Columns are matched by name, so
    /// the test file may order them differently from the train file.
    pub fn transform(&self, dataset: &Dataset) -> LabResult<Vec<Vec<f32>>> {
        let idxs = self
            .columns
            .iter()
            .map(|c| {
                dataset.feature_index(c.name()).ok_or_else(|| {
                    LabError::training(format!("feature column '{}' is missing", c.name()))
                })
            })
            .collect::<LabResult<Vec<_>>>()?;

        let width = self.width();
        let mut unparsable = 0usize;
        let rows = dataset
            .features()
            .iter()
            .map(|row| {
                let mut out = Vec::with_capacity(width);
                for (col, &idx) in self.columns.iter().zip(&idxs) {
                    let cell = row[idx].trim();
                    match col {
                        ColumnEncoding::Numeric { mean, std, .. } => match parse_cell(cell) {
                            Some(v) => out.push((v as f32 - mean) / std),
                            None => {
                                if !cell.is_empty() {
                                    unparsable += 1;
                                }
                                out.push(0.0);
                            }
                        },
                        ColumnEncoding::Categorical { levels, .. } => {
                            let hot = levels.iter().position(|l| l == cell);
                            out.extend((0..levels.len()).map(|i| if Some(i) == hot { 1.0 } else { 0.0 }));
                        }
                    }
                }
                out
            })
            .collect();

        if unparsable > 0 {
            tracing::warn!("{} numeric cells could not be parsed and were imputed", unparsable);
        }
        Ok(rows)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetEncoder {
    Classes {
        column:  String,
        classes: Vec<String>,
    },
    Binary {
        columns: Vec<String>,
    },
    Continuous {
        columns: Vec<String>,
        mean:    Vec<f32>,
        std:     Vec<f32>,
        min:     Vec<f32>,
        max:     Vec<f32>,
    },
}

impl TargetEncoder {
    pub fn fit(task: TaskKind, dataset: &Dataset) -> LabResult<Self> {
        let targets = dataset
            .targets()
            .ok_or_else(|| LabError::training("dataset has no target columns"))?;
        let names = dataset.target_names();
        if names.is_empty() {
            return Err(LabError::training("dataset has no target columns"));
        }

        match task {
            TaskKind::MultiClass => {
                let mut classes: Vec<String> = targets.iter().map(|r| r[0].trim().to_string()).collect();
                classes.sort();
                classes.dedup();
                if classes.iter().any(|c| c.is_empty()) {
                    return Err(LabError::training(format!("empty label in column '{}'", names[0])));
                }
                tracing::info!("{} classes: {:?}", classes.len(), classes);
                Ok(Self::Classes { column: names[0].clone(), classes })
            }
            TaskKind::MultiLabel => Ok(Self::Binary { columns: names.to_vec() }),
            TaskKind::Regression => {
                let k = names.len();
                let mut per_col: Vec<Vec<f64>> = vec![Vec::with_capacity(targets.len()); k];
                for (row, values) in targets.iter().enumerate() {
                    for (j, cell) in values.iter().enumerate() {
                        let v = parse_cell(cell).ok_or_else(|| {
                            LabError::training(format!("row {row}: '{cell}' is not a number in '{}'", names[j]))
                        })?;
                        per_col[j].push(v);
                    }
                }
                let (mut mean, mut std, mut min, mut max) = (vec![], vec![], vec![], vec![]);
                for col in &per_col {
                    let (m, s) = mean_std(col);
                    mean.push(m);
                    std.push(s);
                    min.push(col.iter().copied().fold(f64::INFINITY, f64::min) as f32);
                    max.push(col.iter().copied().fold(f64::NEG_INFINITY, f64::max) as f32);
                }
                Ok(Self::Continuous { columns: names.to_vec(), mean, std, min, max })
            }
        }
    }

    pub fn task(&self) -> TaskKind {
        match self {
            Self::Classes { .. } => TaskKind::MultiClass,
            Self::Binary { .. } => TaskKind::MultiLabel,
            Self::Continuous { .. } => TaskKind::Regression,
        }
    }

    /// Number of model outputs.
    pub fn output_dim(&self) -> usize {
        match self {
            Self::Classes { classes, .. } => classes.len(),
            Self::Binary { columns } | Self::Continuous { columns, .. } => columns.len(),
        }
    }

    /// Submission columns after the id column.
    pub fn prediction_columns(&self) -> Vec<String> {
        match self {
            Self::Classes { column, .. } => vec![column.clone()],
            Self::Binary { columns } | Self::Continuous { columns, .. } => columns.clone(),
        }
    }

    pub fn encode(&self, dataset: &Dataset) -> LabResult<Vec<Vec<f32>>> {
        let targets = dataset
            .targets()
            .ok_or_else(|| LabError::training("dataset has no target columns"))?;

        targets
            .iter()
            .enumerate()
            .map(|(row, values)| match self {
                Self::Classes { classes, column } => {
                    let label = values[0].trim();
                    classes
                        .iter()
                        .position(|c| c == label)
                        .map(|i| vec![i as f32])
                        .ok_or_else(|| LabError::training(format!("row {row}: unknown {column} '{label}'")))
                }
                Self::Binary { columns } => values
                    .iter()
                    .zip(columns)
                    .map(|(cell, name)| match parse_cell(cell) {
                        Some(v) if v == 0.0 || v == 1.0 => Ok(v as f32),
                        _ => Err(LabError::training(format!(
                            "row {row}: target '{name}' must be 0 or 1, got '{cell}'"
                        ))),
                    })
                    .collect(),
                Self::Continuous { columns, mean, std, .. } => values
                    .iter()
                    .enumerate()
                    .map(|(j, cell)| {
                        parse_cell(cell)
                            .map(|v| (v as f32 - mean[j]) / std[j])
                            .ok_or_else(|| {
                                LabError::training(format!("row {row}: '{cell}' is not a number in '{}'", columns[j]))
                            })
                    })
                    .collect(),
            })
            .collect()
    }

    /// Decode activated model outputs into submission cells.
    ///
    /// `outputs` are probabilities (softmax / sigmoid) for the
    /// classification tasks and standardized values for regression.
    pub fn decode(&self, outputs: &[Vec<f32>]) -> LabResult<Vec<Vec<String>>> {
        let dim = self.output_dim();
        if let Some(bad) = outputs.iter().find(|o| o.len() != dim) {
            return Err(LabError::format(format!(
                "model produced {} outputs per row, expected {dim}",
                bad.len()
            )));
        }

        Ok(outputs
            .iter()
            .map(|out| match self {
                Self::Classes { classes, .. } => {
                    let best = argmax(out);
                    vec![classes[best].clone()]
                }
                Self::Binary { .. } => out.iter().map(|p| format!("{:.6}", p.clamp(0.0, 1.0))).collect(),
                Self::Continuous { mean, std, min, max, .. } => out
                    .iter()
                    .enumerate()
                    .map(|(j, v)| format!("{:.6}", (v * std[j] + mean[j]).clamp(min[j], max[j])))
                    .collect(),
            })
            .collect())
    }
}

/// Index of the largest value; ties go to the first.
pub fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) })
        .0
}
