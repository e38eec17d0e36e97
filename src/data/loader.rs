// ============================================================
// Layer 4 — Competition CSV Loader
// ============================================================
// Reads a competition's CSV files from a local directory using
// the csv crate.
//
// Directory convention (datasets are never version-controlled):
//
//   <competition>/
//     dataset/              ← downloaded from the Kaggle page
//       train.csv
//       test.csv
//       sample_submission.csv
//       layout.json         ← optional, for non built-in competitions
//
// If there is no dataset/ subdirectory the given directory is
// used as the dataset root directly.
//
// Loading is a pure read: the same directory always yields the
// same Dataset, row for row.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::competition::Layout;
use crate::domain::dataset::{Dataset, Split};
use crate::domain::error::{LabError, LabResult};
use crate::domain::traits::DatasetSource;

pub const LAYOUT_FILE: &str = "layout.json";

/// Loads competition data from a directory of CSV files.
/// Implements the DatasetSource trait from Layer 3.
pub struct CsvLoader {
    dir: PathBuf,
}

/// Header and id order of the host's sample submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSubmission {
    pub header: Vec<String>,
    pub ids:    Vec<String>,
}

/// A raw CSV file: header plus string cells.
struct CsvTable {
    header: Vec<String>,
    rows:   Vec<Vec<String>>,
}

impl CsvTable {
    fn column(&self, name: &str, path: &Path) -> LabResult<usize> {
        self.header.iter().position(|h| h == name).ok_or_else(|| {
            LabError::training(format!("column '{name}' not found in '{}'", path.display()))
        })
    }
}

impl CsvLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<dir>/dataset` when it exists, otherwise `<dir>` itself.
    pub fn dataset_root(&self) -> PathBuf {
        let nested = self.dir.join("dataset");
        if nested.is_dir() {
            nested
        } else {
            self.dir.clone()
        }
    }

    /// Resolve a competition identifier into a Layout.
    /// A layout.json in the dataset root wins over the built-in table.
    pub fn resolve_layout(&self, competition: &str) -> LabResult<Layout> {
        let path = self.dataset_root().join(LAYOUT_FILE);
        let layout = if path.is_file() {
            tracing::info!("Using layout from '{}'", path.display());
            let layout: Layout = serde_json::from_str(&fs::read_to_string(&path)?)?;
            if layout.competition != competition {
                tracing::warn!(
                    "layout.json describes '{}' but '{}' was requested",
                    layout.competition,
                    competition
                );
            }
            layout
        } else {
            Layout::builtin(competition)?
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Read the sample submission if the layout names one and it exists.
    pub fn load_sample_submission(&self, layout: &Layout) -> LabResult<Option<SampleSubmission>> {
        let Some(name) = &layout.sample_submission else {
            return Ok(None);
        };
        let path = self.dataset_root().join(name);
        if !path.is_file() {
            tracing::debug!("No sample submission at '{}'", path.display());
            return Ok(None);
        }

        let table = read_table(&path)?;
        let id_idx = table.column(&layout.id_column, &path)?;
        let ids = table.rows.into_iter().map(|mut r| r.swap_remove(id_idx)).collect();
        Ok(Some(SampleSubmission { header: table.header, ids }))
    }

    /// Fail with MissingData unless every file is present.
    fn ensure_present(&self, layout: &Layout, files: &[&str]) -> LabResult<PathBuf> {
        let root = self.dataset_root();
        let missing: Vec<String> = files
            .iter()
            .filter(|f| !root.join(f).is_file())
            .map(|f| f.to_string())
            .collect();

        if missing.is_empty() {
            Ok(root)
        } else {
            Err(LabError::MissingData {
                competition: layout.competition.clone(),
                dir:         root,
                missing,
            })
        }
    }

    fn load_train(&self, layout: &Layout) -> LabResult<Dataset> {
        let root = self.ensure_present(layout, &layout.required_train_files())?;
        let train_path = root.join(&layout.train_file);
        let train = read_table(&train_path)?;
        let id_idx = train.column(&layout.id_column, &train_path)?;

        let (target_names, targets, exclude) = match &layout.targets_file {
            // Targets live in their own file and are joined by id
            Some(name) => {
                let path = root.join(name);
                let table = read_table(&path)?;
                let (names, by_id) = targets_by_id(layout, &table, &path)?;

                let mut targets = Vec::with_capacity(train.rows.len());
                for row in &train.rows {
                    let id = &row[id_idx];
                    let t = by_id.get(id.as_str()).ok_or_else(|| {
                        LabError::training(format!(
                            "id '{id}' has features but no row in '{}'",
                            path.display()
                        ))
                    })?;
                    targets.push(t.clone());
                }
                if by_id.len() != train.rows.len() {
                    tracing::warn!(
                        "'{}' has {} rows for {} training ids; extras are ignored",
                        name,
                        by_id.len(),
                        train.rows.len()
                    );
                }
                (names.clone(), targets, names)
            }
            // Targets are columns of the train file itself
            None => {
                let idxs = layout
                    .target_columns
                    .iter()
                    .map(|c| train.column(c, &train_path))
                    .collect::<LabResult<Vec<_>>>()?;
                let targets = train
                    .rows
                    .iter()
                    .map(|r| idxs.iter().map(|&i| r[i].clone()).collect())
                    .collect();
                (layout.target_columns.clone(), targets, layout.target_columns.clone())
            }
        };

        let (feature_names, ids, features) = split_features(&train, id_idx, &exclude);
        tracing::info!(
            "Loaded {} training rows with {} features and {} targets",
            ids.len(),
            feature_names.len(),
            target_names.len()
        );

        Dataset::new(
            layout.competition.clone(),
            Split::Train,
            ids,
            feature_names,
            features,
            target_names,
            Some(targets),
        )
    }

    fn load_test(&self, layout: &Layout) -> LabResult<Dataset> {
        let root = self.ensure_present(layout, &layout.required_test_files())?;
        let path = root.join(&layout.test_file);
        let test = read_table(&path)?;
        let id_idx = test.column(&layout.id_column, &path)?;

        let (feature_names, ids, features) = split_features(&test, id_idx, &layout.target_columns);
        tracing::info!("Loaded {} test rows", ids.len());

        Dataset::new(
            layout.competition.clone(),
            Split::Test,
            ids,
            feature_names,
            features,
            Vec::new(),
            None,
        )
    }
}

impl DatasetSource for CsvLoader {
    fn load(&self, layout: &Layout, split: Split) -> LabResult<Dataset> {
        match split {
            Split::Train => self.load_train(layout),
            Split::Test => self.load_test(layout),
        }
    }
}

/// Read a whole CSV file. Ragged rows are rejected by the csv crate.
fn read_table(path: &Path) -> LabResult<CsvTable> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    tracing::debug!("Read {} rows from '{}'", rows.len(), path.display());
    Ok(CsvTable { header, rows })
}

/// Split a table into (feature names, ids, feature rows), leaving
/// out the id column and every column named in `exclude`.
fn split_features(
    table:   &CsvTable,
    id_idx:  usize,
    exclude: &[String],
) -> (Vec<String>, Vec<String>, Vec<Vec<String>>) {
    let keep: Vec<usize> = (0..table.header.len())
        .filter(|&i| i != id_idx && !exclude.contains(&table.header[i]))
        .collect();

    let names = keep.iter().map(|&i| table.header[i].clone()).collect();
    let ids = table.rows.iter().map(|r| r[id_idx].clone()).collect();
    let rows = table
        .rows
        .iter()
        .map(|r| keep.iter().map(|&i| r[i].clone()).collect())
        .collect();
    (names, ids, rows)
}

/// Index a separate targets file by id.
fn targets_by_id<'t>(
    layout: &Layout,
    table:  &'t CsvTable,
    path:   &Path,
) -> LabResult<(Vec<String>, HashMap<&'t str, Vec<String>>)> {
    let id_idx = table.column(&layout.id_column, path)?;
    let idxs: Vec<usize> = if layout.target_columns.is_empty() {
        (0..table.header.len()).filter(|&i| i != id_idx).collect()
    } else {
        layout
            .target_columns
            .iter()
            .map(|c| table.column(c, path))
            .collect::<LabResult<_>>()?
    };
    let names = idxs.iter().map(|&i| table.header[i].clone()).collect();

    let mut by_id = HashMap::with_capacity(table.rows.len());
    for row in &table.rows {
        let values = idxs.iter().map(|&i| row[i].clone()).collect();
        if by_id.insert(row[id_idx].as_str(), values).is_some() {
            return Err(LabError::training(format!(
                "duplicate id '{}' in '{}'",
                row[id_idx],
                path.display()
            )));
        }
    }
    Ok((names, by_id))
}
