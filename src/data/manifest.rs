// ============================================================
// Layer 4 — Recording Manifest
// ============================================================
// Maps every recording key found in a directory to its files:
//
//   <key>_cA2_features.csv ┐
//   <key>_cD1_features.csv ├─ one feature file per coefficient band
//   <key>_cD2_features.csv ┘
//   <key>_orientation_kalman_windowed.csv   (preferred ground truth)
//   <key>_orientation_simple_windowed.csv   (fallback ground truth)
//
// The manifest is validated when it is built: a key with a band
// missing, or with neither ground-truth variant, is an error
// rather than a recording that silently disappears.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::DatasetError;
use crate::domain::band::Band;

const FEATURE_SUFFIX: &str = "_features.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundTruthVariant {
    Kalman,
    Simple,
}

impl GroundTruthVariant {
    /// Preference order
    pub const ALL: [GroundTruthVariant; 2] = [GroundTruthVariant::Kalman, GroundTruthVariant::Simple];

    pub fn file_name(&self, key: &str) -> String {
        match self {
            GroundTruthVariant::Kalman => format!("{key}_orientation_kalman_windowed.csv"),
            GroundTruthVariant::Simple => format!("{key}_orientation_simple_windowed.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroundTruthFile {
    pub path:    PathBuf,
    pub variant: GroundTruthVariant,
}

/// All files belonging to one recording.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingFiles {
    /// Iterates in band order (cA2, cD1, cD2)
    pub bands:        BTreeMap<Band, PathBuf>,
    pub ground_truth: GroundTruthFile,
}

/// Anything that can enumerate recordings by key.
///
/// Keys come back sorted so every consumer concatenates
/// recordings in the same order.
pub trait RecordingSource {
    fn recordings(&self) -> Result<BTreeMap<String, RecordingFiles>, DatasetError>;
}

/// Directory-backed recording source.
pub struct RecordingManifest {
    dir: PathBuf,
}

impl RecordingManifest {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RecordingSource for RecordingManifest {
    fn recordings(&self) -> Result<BTreeMap<String, RecordingFiles>, DatasetError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|source| DatasetError::Io { path: self.dir.clone(), source })?;

        let mut groups: BTreeMap<String, BTreeMap<Band, PathBuf>> = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|source| DatasetError::Io { path: self.dir.clone(), source })?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };

            match parse_feature_file_name(name) {
                Some((key, Ok(band))) => {
                    groups.entry(key.to_string()).or_default().insert(band, entry.path());
                }
                Some((_, Err(e))) => tracing::warn!("Skipping '{}': {}", name, e),
                None => {}
            }
        }

        if groups.is_empty() {
            return Err(DatasetError::NoRecordings { dir: self.dir.clone() });
        }

        let mut recordings = BTreeMap::new();
        for (key, bands) in groups {
            if let Some(missing) = Band::ALL.iter().find(|b| !bands.contains_key(b)) {
                return Err(DatasetError::MissingBand { key, band: missing.to_string() });
            }
            let ground_truth = find_ground_truth(&self.dir, &key)?;
            tracing::debug!(
                "Recording '{}': {} bands, ground truth {:?}",
                key, bands.len(), ground_truth.variant
            );
            recordings.insert(key, RecordingFiles { bands, ground_truth });
        }

        Ok(recordings)
    }
}

/// Split `<key>_<band>_features.csv` into key and band.
/// Returns None for files that are not feature files at all.
fn parse_feature_file_name(name: &str) -> Option<(&str, Result<Band, String>)> {
    let stem = name.strip_suffix(FEATURE_SUFFIX)?;
    let (key, band) = stem.rsplit_once('_')?;
    if key.is_empty() {
        return None;
    }
    Some((key, band.parse()))
}

fn find_ground_truth(dir: &Path, key: &str) -> Result<GroundTruthFile, DatasetError> {
    let mut tried = Vec::new();
    for variant in GroundTruthVariant::ALL {
        let path = dir.join(variant.file_name(key));
        if path.is_file() {
            if variant != GroundTruthVariant::Kalman {
                tracing::debug!("No kalman ground truth for '{}', using {:?}", key, variant);
            }
            return Ok(GroundTruthFile { path, variant });
        }
        tried.push(path);
    }
    Err(DatasetError::MissingGroundTruth { key: key.to_string(), tried })
}
