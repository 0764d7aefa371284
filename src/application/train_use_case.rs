// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load + align feature files and ground truth  (Layer 4)
//   Step 2: Check the input width against the catalog     (Layer 3b)
//   Step 3: Cut into sequences, drop the last partial batch (Layer 4)
//   Step 4: Train on the selected backend                 (Layer 5)
//   Step 5: Save weights + metadata                       (Layer 6)

use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context, Result};
use burn::{data::dataset::Dataset, tensor::backend::AutodiffBackend};
use serde::{Deserialize, Serialize};

use crate::data::{dataset::OrientationDataset, loader::DatasetLoader};
use crate::domain::band::Band;
use crate::features::FeatureCatalog;
use crate::infra::{
    checkpoint::{CheckpointManager, CheckpointMeta},
    metrics::MetricsLogger,
};
use crate::ml::{
    backend::{self, CpuTrainBackend, DeviceChoice, GpuTrainBackend},
    model::OrientationModelConfig,
    trainer::Trainer,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Serialisable so a run
// can be described by a JSON file instead of CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub data_dir:         String,
    pub checkpoint_dir:   String,
    pub channels:         usize,
    pub hidden_size:      usize,
    pub num_layers:       usize,
    pub seq_length:       usize,
    pub batch_size:       usize,
    pub epochs:           usize,
    pub lr:               f64,
    pub seed:             u64,
    pub ignored_features: Vec<String>,
    pub device:           DeviceChoice,
    /// Report the batch loss every this many batches
    pub log_every:        usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:         "data/features".to_string(),
            checkpoint_dir:   "checkpoints".to_string(),
            channels:         5,
            hidden_size:      128,
            num_layers:       1,
            seq_length:       5,
            batch_size:       4,
            epochs:           100,
            lr:               0.001,
            seed:             42,
            ignored_features: Vec::new(),
            device:           DeviceChoice::Auto,
            log_every:        100,
        }
    }
}

impl TrainConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid training config '{}'", path.display()))
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config:  TrainConfig,
    catalog: FeatureCatalog,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config, catalog: FeatureCatalog::standard() }
    }

    /// Run the pipeline; returns the saved checkpoint's weights path.
    pub fn execute(&self) -> Result<PathBuf> {
        let cfg = &self.config;
        ensure!(cfg.seq_length > 0 && cfg.batch_size > 0, "seq_length and batch_size must be positive");
        if !cfg.batch_size.is_power_of_two() {
            tracing::warn!("batch_size {} is not a power of two", cfg.batch_size);
        }

        // ── Step 1: Load feature files ────────────────────────────────────────
        tracing::info!("Loading feature files from '{}'", cfg.data_dir);
        let data = DatasetLoader::new(&cfg.data_dir)
            .with_channels(cfg.channels)
            .with_ignored_features(cfg.ignored_features.clone())
            .load()
            .with_context(|| format!("Cannot build dataset from '{}'", cfg.data_dir))?;

        // ── Step 2: Input width is derived from the catalog, never typed in ───
        let expected = self.catalog.model_input_width(cfg.channels, Band::ALL.len());
        ensure!(
            data.inputs.width() == expected,
            "feature files have {} columns, catalog v{} with {} channels and {} bands needs {}",
            data.inputs.width(), self.catalog.version(), cfg.channels, Band::ALL.len(), expected
        );

        let model_cfg = OrientationModelConfig::new(expected)
            .with_hidden_size(cfg.hidden_size)
            .with_num_layers(cfg.num_layers);
        ensure!(
            data.targets.width() == model_cfg.output_size,
            "ground truth has {} value columns ({}), the model predicts {} (pitch, roll)",
            data.targets.width(), data.targets.columns().join(", "), model_cfg.output_size
        );

        // ── Step 3: Sequences ─────────────────────────────────────────────────
        let dataset = OrientationDataset::from_loaded(data, cfg.seq_length, cfg.batch_size)?;
        tracing::info!(
            "{} sequences of {} windows ({} rows dropped)",
            dataset.len(), cfg.seq_length, dataset.dropped_rows()
        );

        // ── Step 4 + 5: Train and save ────────────────────────────────────────
        match cfg.device {
            DeviceChoice::Auto => self.train_on::<GpuTrainBackend>(model_cfg, dataset, backend::gpu_device()),
            DeviceChoice::Cpu  => self.train_on::<CpuTrainBackend>(model_cfg, dataset, backend::cpu_device()),
        }
    }

    fn train_on<B: AutodiffBackend>(
        &self,
        model_cfg: OrientationModelConfig,
        dataset:   OrientationDataset,
        device:    B::Device,
    ) -> Result<PathBuf> {
        let cfg = &self.config;
        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir);
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        let mut trainer = Trainer::<B>::new(cfg, device).with_metrics(metrics);
        let outcome = trainer.fit(&model_cfg, dataset)?;

        if let Some(d) = outcome.divergence {
            bail!(
                "training diverged at epoch {} batch {} (loss {}); no checkpoint saved",
                d.epoch, d.batch, d.loss
            );
        }
        if outcome.cancelled {
            tracing::warn!("Saving a checkpoint from a cancelled run");
        }

        let meta = CheckpointMeta {
            model:            model_cfg,
            catalog_version:  self.catalog.version(),
            channels:         cfg.channels,
            seq_length:       cfg.seq_length,
            ignored_features: cfg.ignored_features.clone(),
            created_at:       chrono::Local::now().to_rfc3339(),
        };
        let stem = ckpt.save(&outcome.model, &meta)?;
        Ok(PathBuf::from(&cfg.checkpoint_dir).join(format!("{stem}.mpk.gz")))
    }
}
