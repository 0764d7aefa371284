// ============================================================
// Layer 5 — Estimator
// ============================================================
// Runs a trained model without autodiff: estimate orientation
// for a single sequence, or score a whole dataset (MSE overall
// and per output, i.e. pitch and roll).

use anyhow::{ensure, Result};
use burn::{
    data::{dataloader::batcher::Batcher, dataset::Dataset},
    prelude::*,
};
use serde::Serialize;

use crate::data::{
    batcher::SequenceBatcher,
    dataset::{OrientationDataset, SequenceSample},
};
use crate::domain::orientation::Orientation;
use crate::infra::checkpoint::{CheckpointManager, CheckpointMeta};
use crate::ml::model::{OrientationModel, OrientationModelConfig};

/// Sequences per forward pass during evaluation
const EVAL_BATCH: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub sequences:      usize,
    pub mse:            f64,
    /// One entry per model output (pitch, roll)
    pub per_output_mse: Vec<f64>,
}

pub struct Estimator<B: Backend> {
    model:       OrientationModel<B>,
    input_size:  usize,
    output_size: usize,
    device:      B::Device,
}

impl<B: Backend> Estimator<B> {
    pub fn new(model: OrientationModel<B>, config: &OrientationModelConfig, device: B::Device) -> Self {
        Self {
            model,
            input_size:  config.input_size,
            output_size: config.output_size,
            device,
        }
    }

    /// Load a checkpoint (`None` = latest) together with its metadata.
    pub fn from_checkpoint(
        ckpt:   &CheckpointManager,
        stem:   Option<&str>,
        device: B::Device,
    ) -> Result<(Self, CheckpointMeta)> {
        let (model, meta) = ckpt.load::<B>(stem, &device)?;
        tracing::info!("Model loaded from checkpoint (input width {})", meta.model.input_size);
        Ok((Self::new(model, &meta.model, device), meta))
    }

    /// Orientation for every window of one sequence, in order.
    pub fn estimate(&self, sequence: &[Vec<f32>]) -> Result<Vec<Orientation>> {
        ensure!(!sequence.is_empty(), "cannot estimate an empty sequence");
        ensure!(self.output_size >= 2, "model predicts {} values, need pitch and roll", self.output_size);
        ensure!(
            sequence.iter().all(|row| row.len() == self.input_size),
            "every window must have {} features", self.input_size
        );

        let flat: Vec<f32> = sequence.iter().flatten().copied().collect();
        let input = Tensor::<B, 3>::from_data(
            TensorData::new(flat, [1, sequence.len(), self.input_size]),
            &self.device,
        );
        let out = to_vec(self.model.forward(input))?;

        Ok(out.chunks(self.output_size).map(|p| Orientation::new(p[0], p[1])).collect())
    }

    /// Score every sequence of the dataset in order.
    pub fn evaluate(&self, dataset: &OrientationDataset) -> Result<EvaluationReport> {
        ensure!(
            dataset.input_width() == self.input_size,
            "dataset has {} input columns but the model expects {}",
            dataset.input_width(), self.input_size
        );
        ensure!(
            dataset.target_width() == self.output_size,
            "dataset has {} target columns but the model predicts {}",
            dataset.target_width(), self.output_size
        );

        let outputs = self.output_size;
        let batcher = SequenceBatcher::<B>::new(
            self.device.clone(),
            dataset.seq_length(),
            dataset.input_width(),
            outputs,
        );

        let mut sq_err = vec![0.0f64; outputs];
        let mut count  = 0usize;
        let indices: Vec<usize> = (0..dataset.len()).collect();

        for chunk in indices.chunks(EVAL_BATCH) {
            let items: Vec<SequenceSample> = chunk.iter().filter_map(|&i| dataset.get(i)).collect();
            let batch = batcher.batch(items);

            let predicted = to_vec(self.model.forward(batch.inputs))?;
            let expected  = to_vec(batch.targets)?;
            for (p, t) in predicted.chunks(outputs).zip(expected.chunks(outputs)) {
                for k in 0..outputs {
                    sq_err[k] += ((p[k] - t[k]) as f64).powi(2);
                }
                count += 1;
            }
        }

        ensure!(count > 0, "dataset has no complete sequences to evaluate");
        let per_output_mse: Vec<f64> = sq_err.iter().map(|s| s / count as f64).collect();
        let mse = per_output_mse.iter().sum::<f64>() / outputs as f64;

        Ok(EvaluationReport { sequences: dataset.len(), mse, per_output_mse })
    }
}

fn to_vec<B: Backend, const D: usize>(t: Tensor<B, D>) -> Result<Vec<f32>> {
    t.into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow::anyhow!("Cannot read tensor data: {e:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn estimator(width: usize) -> Estimator<TestBackend> {
        let device = Default::default();
        let config = OrientationModelConfig::new(width).with_hidden_size(4);
        let model = config.init(&device);
        Estimator::new(model, &config, device)
    }

    #[test]
    fn test_estimate_one_orientation_per_window() {
        let est = estimator(3);
        let seq = vec![vec![0.1, 0.2, 0.3]; 5];
        assert_eq!(est.estimate(&seq).unwrap().len(), 5);
        assert!(est.estimate(&[vec![0.1, 0.2]]).is_err());
    }

    #[test]
    fn test_evaluate_matches_manual_mse() {
        let est = estimator(3);
        let inputs: Vec<f32> = (0..30).map(|i| i as f32 * 0.01).collect();
        let targets = vec![0.0f32; 20];
        let ds = OrientationDataset::new(inputs.clone(), 3, targets, 2, 5, 1).unwrap();

        let report = est.evaluate(&ds).unwrap();
        assert_eq!(report.sequences, 2);
        assert_eq!(report.per_output_mse.len(), 2);

        // targets are zero, so the MSE is the mean squared prediction
        let rows: Vec<Vec<f32>> = inputs.chunks(3).map(|r| r.to_vec()).collect();
        let mut manual = 0.0f64;
        for seq in rows.chunks(5) {
            for o in est.estimate(seq).unwrap() {
                manual += (o.pitch as f64).powi(2) + (o.roll as f64).powi(2);
            }
        }
        manual /= 20.0;
        assert!((report.mse - manual).abs() < 1e-5);
    }

    #[test]
    fn test_evaluate_rejects_extra_target_columns() {
        let est = estimator(3);
        let ds = OrientationDataset::new(vec![0.1f32; 30], 3, vec![0.0f32; 30], 3, 5, 1).unwrap();
        let err = est.evaluate(&ds).unwrap_err();
        assert!(err.to_string().contains("3 target columns"));
    }
}
