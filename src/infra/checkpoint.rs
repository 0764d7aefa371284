// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights with Burn's named
// MessagePack recorder (gzip, full precision, so a reload
// reproduces the saved weights exactly).
//
// What gets saved per checkpoint:
//   1. model_<timestamp>.mpk.gz — all learned parameters
//   2. model_<timestamp>.json   — architecture + data contract
//   3. latest_model.json        — stem of the newest checkpoint
//
// The weights file carries no architecture, so the metadata
// is what lets a loader rebuild an identical model before
// loading the parameters into it.
//
// File naming convention:
//   checkpoints/
//     model_20240611_142233.mpk.gz
//     model_20240611_142233.json
//     model_20240611_142233_1.mpk.gz   ← second save in the same second
//     latest_model.json

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use serde::{Deserialize, Serialize};

use crate::ml::model::{OrientationModel, OrientationModelConfig};

const LATEST_FILE: &str = "latest_model.json";

type WeightsRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

/// Everything needed to rebuild the model and feed it the same
/// kind of input it was trained on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub model:            OrientationModelConfig,
    pub catalog_version:  u32,
    pub channels:         usize,
    pub seq_length:       usize,
    pub ignored_features: Vec<String>,
    pub created_at:       String,
}

/// Manages saving and loading of model checkpoints in one directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save weights and metadata under a fresh timestamped stem.
    /// Returns the stem.
    pub fn save<B: Backend>(&self, model: &OrientationModel<B>, meta: &CheckpointMeta) -> Result<String> {
        let stem = self.fresh_stem();
        let path = self.dir.join(&stem);

        WeightsRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let meta_path = self.dir.join(format!("{stem}.json"));
        fs::write(&meta_path, serde_json::to_string_pretty(meta)?)
            .with_context(|| format!("Cannot write '{}'", meta_path.display()))?;

        // Update the latest pointer so `evaluate` finds it by default
        fs::write(self.dir.join(LATEST_FILE), serde_json::to_string(&stem)?)
            .with_context(|| format!("Failed to write {LATEST_FILE}"))?;

        tracing::info!("Saved checkpoint '{}'", stem);
        Ok(stem)
    }

    /// Rebuild the architecture from metadata and load the weights.
    /// `None` loads the most recently saved checkpoint.
    pub fn load<B: Backend>(
        &self,
        stem:   Option<&str>,
        device: &B::Device,
    ) -> Result<(OrientationModel<B>, CheckpointMeta)> {
        let stem = match stem {
            Some(s) => s.to_string(),
            None    => self.latest_stem()?,
        };
        let meta = self.load_meta(&stem)?;
        let path = self.dir.join(&stem);

        let record = WeightsRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?", path.display())
            })?;

        let model = meta.model.init::<B>(device).load_record(record);
        Ok((model, meta))
    }

    pub fn load_meta(&self, stem: &str) -> Result<CheckpointMeta> {
        let path = self.dir.join(format!("{stem}.json"));
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read checkpoint metadata '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Stem written by the most recent save.
    pub fn latest_stem(&self) -> Result<String> {
        let path = self.dir.join(LATEST_FILE);
        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot find '{}'. Have you run 'train' first?", path.display()))?;
        Ok(serde_json::from_str::<String>(&s)?)
    }

    fn fresh_stem(&self) -> String {
        let base = format!("model_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
        let taken = |stem: &str| self.dir.join(format!("{stem}.json")).exists();
        if !taken(&base) {
            return base;
        }
        (1..)
            .map(|n| format!("{base}_{n}"))
            .find(|s| !taken(s))
            .unwrap_or(base)
    }
}
