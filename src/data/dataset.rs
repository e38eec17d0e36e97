use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One encoded row: standardized / one-hot features plus the
/// encoded target (a single class index for multi-class tasks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularSample {
    pub features: Vec<f32>,
    pub target:   Vec<f32>,
}

impl TabularSample {
    /// Zip encoded feature rows with encoded target rows.
    pub fn zip(features: Vec<Vec<f32>>, targets: Vec<Vec<f32>>) -> Vec<Self> {
        features
            .into_iter()
            .zip(targets)
            .map(|(features, target)| Self { features, target })
            .collect()
    }
}

pub struct TabularDataset {
    samples: Vec<TabularSample>,
}

impl TabularDataset {
    pub fn new(samples: Vec<TabularSample>) -> Self { Self { samples } }
}

impl Dataset<TabularSample> for TabularDataset {
    fn get(&self, index: usize) -> Option<TabularSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
