// ============================================================
// Layer 4 — Dataset Loader
// ============================================================
// Turns a directory of per-window feature files into two
// aligned matrices: model inputs and ground-truth orientation.
//
// Per recording (keys in sorted order):
//   1. read the three band files, suffix every column with the
//      band label (emg_0_f_mav → emg_0_f_mav_cA2) and place them
//      side by side in band order cA2, cD1, cD2
//   2. read the ground truth (kalman, else simple) and drop the
//      `window` id column
//   3. check that both have the same number of rows
//
// Then all recordings are stacked vertically, and ignored
// features are zeroed so the input width never changes.

use std::path::PathBuf;

use crate::data::manifest::{GroundTruthVariant, RecordingFiles, RecordingManifest, RecordingSource};
use crate::data::table::FeatureTable;
use crate::data::DatasetError;
use crate::domain::band::Band;
use crate::features::{FeatureCatalog, FeatureKind};

/// Ground-truth column holding the window id, never a target.
pub const WINDOW_COLUMN: &str = "window";

/// Default number of EMG channels
pub const EMG_CHANNELS: usize = 5;

/// Where one recording's rows sit in the stacked matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSpan {
    pub key:     String,
    pub start:   usize,
    pub rows:    usize,
    pub variant: GroundTruthVariant,
}

/// Aligned inputs and targets, row i of one matching row i of the other.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub inputs:     FeatureTable,
    pub targets:    FeatureTable,
    pub recordings: Vec<RecordingSpan>,
}

impl LoadedData {
    pub fn rows(&self) -> usize {
        self.inputs.rows()
    }
}

pub struct DatasetLoader {
    dir:              PathBuf,
    channels:         usize,
    ignored_features: Vec<String>,
}

impl DatasetLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir:              dir.into(),
            channels:         EMG_CHANNELS,
            ignored_features: Vec::new(),
        }
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_ignored_features(mut self, features: Vec<String>) -> Self {
        self.ignored_features = features;
        self
    }

    /// Load every recording found in the loader's directory.
    pub fn load(&self) -> Result<LoadedData, DatasetError> {
        self.load_from(&RecordingManifest::new(&self.dir))
    }

    pub fn load_from(&self, source: &impl RecordingSource) -> Result<LoadedData, DatasetError> {
        let recordings = source.recordings()?;

        let mut inputs  = Vec::with_capacity(recordings.len());
        let mut targets = Vec::with_capacity(recordings.len());
        let mut spans   = Vec::with_capacity(recordings.len());
        let mut start   = 0;

        for (key, files) in &recordings {
            let features = load_recording_features(key, files)?;
            let truth    = FeatureTable::read_csv(&files.ground_truth.path, &[WINDOW_COLUMN])?;

            if features.rows() != truth.rows() {
                return Err(DatasetError::Alignment {
                    key:     key.clone(),
                    inputs:  features.rows(),
                    targets: truth.rows(),
                });
            }
            if let Some(first) = inputs.first() {
                check_same_layout(key, first, &features)?;
            }
            if let Some(first) = targets.first() {
                check_same_layout(key, first, &truth)?;
            }

            tracing::debug!("Recording '{}': {} windows", key, features.rows());
            spans.push(RecordingSpan {
                key:     key.clone(),
                start,
                rows:    features.rows(),
                variant: files.ground_truth.variant,
            });
            start += features.rows();
            inputs.push(features);
            targets.push(truth);
        }

        let mut inputs = FeatureTable::vconcat(&inputs);
        let targets    = FeatureTable::vconcat(&targets);

        if !self.ignored_features.is_empty() {
            mask_features(&mut inputs, &self.ignored_features, self.channels);
        }

        tracing::info!(
            "Loaded {} recordings: {} windows, {} input columns, {} target columns",
            spans.len(), inputs.rows(), inputs.width(), targets.width()
        );

        Ok(LoadedData { inputs, targets, recordings: spans })
    }
}

/// Read one recording's band files and place them side by side.
fn load_recording_features(key: &str, files: &RecordingFiles) -> Result<FeatureTable, DatasetError> {
    let mut bands: Vec<(Band, FeatureTable)> = Vec::with_capacity(files.bands.len());
    for (band, path) in &files.bands {
        let mut table = FeatureTable::read_csv(path, &[])?;
        table.rename_columns(|c| format!("{c}_{band}"));
        bands.push((*band, table));
    }

    let expected = bands.first().map(|(_, t)| t.rows()).unwrap_or(0);
    for (band, table) in &bands {
        if table.rows() != expected {
            return Err(DatasetError::BandRowMismatch {
                key:    key.to_string(),
                band:   band.to_string(),
                expected,
                actual: table.rows(),
            });
        }
    }

    let tables: Vec<FeatureTable> = bands.into_iter().map(|(_, t)| t).collect();
    Ok(FeatureTable::hconcat(&tables))
}

fn check_same_layout(key: &str, first: &FeatureTable, next: &FeatureTable) -> Result<(), DatasetError> {
    if first.columns() != next.columns() {
        return Err(DatasetError::ColumnMismatch {
            key:      key.to_string(),
            expected: first.width(),
            actual:   next.width(),
        });
    }
    Ok(())
}

/// Zero every column belonging to an ignored feature on any channel.
///
/// Matches `emg_<c>_f_<feature>` as well as the band-suffixed
/// `emg_<c>_f_<feature>_<band>`. Feature names may be given with
/// or without the `f_` prefix. Returns the zeroed column names.
pub fn mask_features(table: &mut FeatureTable, ignored: &[String], channels: usize) -> Vec<String> {
    let catalog = FeatureCatalog::standard();
    let mut prefixes = Vec::new();
    for name in ignored {
        let feature = if name.starts_with("f_") { name.clone() } else { format!("f_{name}") };
        match FeatureKind::from_name(&feature) {
            Err(_) => tracing::warn!("Ignoring unknown feature '{}'", name),
            Ok(kind) if !catalog.contains(kind) => {
                tracing::warn!("'{}' is not an active catalog feature; no input column carries it", name)
            }
            Ok(_) => {}
        }
        prefixes.extend((0..channels).map(|c| format!("emg_{c}_{feature}")));
    }

    let zeroed = table.zero_columns(|column| {
        prefixes.iter().any(|p| {
            column == p
                || column
                    .strip_prefix(p.as_str())
                    .and_then(|rest| rest.strip_prefix('_'))
                    .is_some_and(|band| band.parse::<Band>().is_ok())
        })
    });

    if zeroed.is_empty() {
        tracing::warn!("Ignored features {:?} matched no input columns", ignored);
    } else {
        tracing::info!("Zeroed {} columns for ignored features {:?}", zeroed.len(), ignored);
    }
    zeroed
}
