// ============================================================
// Layer 4 — Sequence Batcher
// ============================================================
// Implements Burn's Batcher trait to stack SequenceSamples into
// tensors:
//
//   Input:  Vec of N SequenceSamples, each S rows
//   Output: inputs  [N, S, input_width]
//           targets [N, S, target_width]
//
// Samples are already flattened row-major, so stacking is a
// plain concatenation followed by a reshape.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::SequenceSample;

/// A batch of sequences ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct SequenceBatch<B: Backend> {
    /// `[batch, seq_length, input_width]`
    pub inputs:  Tensor<B, 3>,
    /// `[batch, seq_length, target_width]`
    pub targets: Tensor<B, 3>,
}

#[derive(Clone, Debug)]
pub struct SequenceBatcher<B: Backend> {
    pub device:       B::Device,
    pub seq_length:   usize,
    pub input_width:  usize,
    pub target_width: usize,
}

impl<B: Backend> SequenceBatcher<B> {
    pub fn new(device: B::Device, seq_length: usize, input_width: usize, target_width: usize) -> Self {
        Self { device, seq_length, input_width, target_width }
    }
}

impl<B: Backend> Batcher<SequenceSample, SequenceBatch<B>> for SequenceBatcher<B> {
    fn batch(&self, items: Vec<SequenceSample>) -> SequenceBatch<B> {
        let batch_size = items.len();

        let inputs_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.inputs.iter().copied())
            .collect();
        let targets_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.targets.iter().copied())
            .collect();

        let inputs = Tensor::<B, 3>::from_data(
            TensorData::new(inputs_flat, [batch_size, self.seq_length, self.input_width]),
            &self.device,
        );
        let targets = Tensor::<B, 3>::from_data(
            TensorData::new(targets_flat, [batch_size, self.seq_length, self.target_width]),
            &self.device,
        );

        SequenceBatch { inputs, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_layout() {
        let device = Default::default();
        let batcher = SequenceBatcher::<NdArray>::new(device, 2, 3, 1);
        let items = vec![
            SequenceSample { inputs: vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], targets: vec![0.5, 1.5] },
            SequenceSample { inputs: vec![6.0, 7.0, 8.0, 9.0, 10.0, 11.0], targets: vec![2.5, 3.5] },
        ];

        let batch = batcher.batch(items);
        assert_eq!(batch.inputs.dims(), [2, 2, 3]);
        assert_eq!(batch.targets.dims(), [2, 2, 1]);

        // second sequence, first timestep
        let row: Vec<f32> = batch.inputs
            .slice([1..2, 0..1, 0..3])
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        assert_eq!(row, vec![6.0, 7.0, 8.0]);
    }
}
