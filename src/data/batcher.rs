// ============================================================
// Layer 4 — Tabular Batcher
// ============================================================
// Implements Burn's Batcher trait to stack TabularSamples into
// tensors for one forward pass.
//
//   Input:  Vec of N samples, F features and T target values each
//   Output: TabularBatch { features: [N, F], targets: [N, T] }
//
// Every sample from one encoder has the same width, so batching
// is a flatten + reshape with no padding.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::dataset::TabularSample;

#[derive(Debug, Clone)]
pub struct TabularBatch<B: Backend> {
    /// Encoded features — shape: [batch_size, input_dim]
    pub features: Tensor<B, 2>,

    /// Encoded targets — shape: [batch_size, target_width].
    /// Multi-class tasks carry the class index as a float in column 0.
    pub targets: Tensor<B, 2>,
}

#[derive(Clone, Debug)]
pub struct TabularBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TabularBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

/// Build a [rows, width] float tensor from equally sized rows.
pub fn rows_to_tensor<B: Backend>(rows: &[Vec<f32>], device: &B::Device) -> Tensor<B, 2> {
    let width = rows.first().map_or(0, Vec::len);
    let flat: Vec<f32> = rows.iter().flat_map(|r| r.iter().copied()).collect();
    Tensor::<B, 2>::from_data(TensorData::new(flat, [rows.len(), width]), device)
}

impl<B: Backend> Batcher<TabularSample, TabularBatch<B>> for TabularBatcher<B> {
    fn batch(&self, items: Vec<TabularSample>) -> TabularBatch<B> {
        let features: Vec<Vec<f32>> = items.iter().map(|s| s.features.clone()).collect();
        let targets: Vec<Vec<f32>> = items.into_iter().map(|s| s.target).collect();

        TabularBatch {
            features: rows_to_tensor(&features, &self.device),
            targets:  rows_to_tensor(&targets, &self.device),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes() {
        let device = Default::default();
        let batcher = TabularBatcher::<NdArray>::new(device);
        let batch = batcher.batch(vec![
            TabularSample { features: vec![1.0, 2.0, 3.0], target: vec![1.0] },
            TabularSample { features: vec![4.0, 5.0, 6.0], target: vec![0.0] },
        ]);
        assert_eq!(batch.features.dims(), [2, 3]);
        assert_eq!(batch.targets.dims(), [2, 1]);

        let values = batch.features.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
