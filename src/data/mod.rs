// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between per-window feature files on disk and
// tensor batches for the model:
//
//   <key>_<band>_features.csv  (+ ground truth per key)
//       │
//       ▼
//   RecordingManifest  → groups files by recording key, validated eagerly
//       │
//       ▼
//   DatasetLoader      → bands side by side, recordings stacked,
//       │                ground truth aligned, optional feature masking
//       ▼
//   OrientationDataset → consecutive sequences, drop-last truncation
//       │
//       ▼
//   SequenceBatcher    → [batch, seq, width] tensors
//       │
//       ▼
//   DataLoader         → shuffled sequence batches for the trainer

use std::path::PathBuf;

/// Groups per-recording files by key
pub mod manifest;

/// Named numeric columns read from CSV
pub mod table;

/// Builds the aligned input / ground-truth matrices
pub mod loader;

/// Implements Burn's Dataset trait over fixed-length sequences
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("cannot read '{path}': {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("malformed CSV '{path}': {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("'{path}' row {row}, column '{column}': '{value}' is not a number")]
    Parse { path: PathBuf, row: usize, column: String, value: String },

    #[error("'{path}' has no header")]
    EmptyTable { path: PathBuf },

    #[error("no feature files found in '{dir}'")]
    NoRecordings { dir: PathBuf },

    #[error("recording '{key}' is missing its {band} feature file")]
    MissingBand { key: String, band: String },

    #[error("recording '{key}' has no ground truth (tried {tried:?})")]
    MissingGroundTruth { key: String, tried: Vec<PathBuf> },

    #[error("recording '{key}': band {band} has {actual} rows, expected {expected}")]
    BandRowMismatch { key: String, band: String, expected: usize, actual: usize },

    #[error("recording '{key}': {inputs} feature rows but {targets} ground-truth rows")]
    Alignment { key: String, inputs: usize, targets: usize },

    #[error("recording '{key}': column layout differs from the first recording (expected {expected} columns, got {actual})")]
    ColumnMismatch { key: String, expected: usize, actual: usize },
}
