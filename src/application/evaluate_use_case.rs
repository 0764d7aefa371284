// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Scores a saved checkpoint on a directory of feature files:
//
//   Step 1: Read checkpoint metadata (architecture, channels,
//           ignored features, sequence length)
//   Step 2: Load the data exactly the way training did
//   Step 3: Run every sequence in order and report the MSE

use anyhow::{Context, Result};
use burn::prelude::Backend;

use crate::data::{dataset::OrientationDataset, loader::DatasetLoader};
use crate::features::FeatureCatalog;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    backend::{self, CpuBackend, DeviceChoice, GpuBackend},
    estimator::{Estimator, EvaluationReport},
};

pub struct EvaluateUseCase {
    checkpoint_dir: String,
    checkpoint:     Option<String>,
    device:         DeviceChoice,
}

impl EvaluateUseCase {
    pub fn new(checkpoint_dir: String, checkpoint: Option<String>, device: DeviceChoice) -> Self {
        Self { checkpoint_dir, checkpoint, device }
    }

    pub fn evaluate(&self, data_dir: &str) -> Result<EvaluationReport> {
        match self.device {
            DeviceChoice::Auto => self.evaluate_on::<GpuBackend>(data_dir, backend::gpu_device()),
            DeviceChoice::Cpu  => self.evaluate_on::<CpuBackend>(data_dir, backend::cpu_device()),
        }
    }

    fn evaluate_on<B: Backend>(&self, data_dir: &str, device: B::Device) -> Result<EvaluationReport> {
        let ckpt = CheckpointManager::new(&self.checkpoint_dir);
        let (estimator, meta) = Estimator::<B>::from_checkpoint(&ckpt, self.checkpoint.as_deref(), device)?;

        let catalog = FeatureCatalog::standard();
        if meta.catalog_version != catalog.version() {
            tracing::warn!(
                "Checkpoint was trained with feature catalog v{}, current is v{}",
                meta.catalog_version, catalog.version()
            );
        }

        let data = DatasetLoader::new(data_dir)
            .with_channels(meta.channels)
            .with_ignored_features(meta.ignored_features.clone())
            .load()
            .with_context(|| format!("Cannot build dataset from '{data_dir}'"))?;

        // batch size 1: only the trailing partial sequence is dropped
        let dataset = OrientationDataset::from_loaded(data, meta.seq_length, 1)?;
        let report = estimator.evaluate(&dataset)?;

        tracing::info!("Evaluated {} sequences: mse={:.6}", report.sequences, report.mse);
        Ok(report)
    }
}
