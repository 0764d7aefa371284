// ============================================================
// Layer 2 — ExtractUseCase
// ============================================================
// Slides a window over a coefficient CSV (one numeric column
// per channel, one row per sample) and writes one feature row
// per window, header taken from the catalog:
//
//   emg_0_f_mav,emg_1_f_mav,...,emg_4_f_ie

use std::path::PathBuf;

use anyhow::{ensure, Context, Result};

use crate::data::table::FeatureTable;
use crate::domain::window::Window;
use crate::features::FeatureCatalog;

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub input:  PathBuf,
    pub output: PathBuf,
    /// Samples per window
    pub window: usize,
    /// Samples between window starts
    pub step:   usize,
}

pub struct ExtractUseCase {
    config:  ExtractConfig,
    catalog: FeatureCatalog,
}

impl ExtractUseCase {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config, catalog: FeatureCatalog::standard() }
    }

    /// Returns the number of windows written.
    pub fn execute(&self) -> Result<usize> {
        let cfg = &self.config;
        ensure!(
            cfg.window >= self.catalog.min_samples(),
            "window of {} samples is too short; the catalog needs at least {}",
            cfg.window, self.catalog.min_samples()
        );
        ensure!(cfg.step > 0, "step must be positive");

        let signal = FeatureTable::read_csv(&cfg.input, &[])?;
        let channels = signal.width();
        tracing::info!(
            "Extracting {} features × {} channels from '{}' ({} samples)",
            self.catalog.len(), channels, cfg.input.display(), signal.rows()
        );

        let mut writer = csv::Writer::from_path(&cfg.output)
            .with_context(|| format!("Cannot create '{}'", cfg.output.display()))?;
        writer.write_record(self.catalog.column_names(channels))?;

        let mut written = 0;
        let mut start = 0;
        while start + cfg.window <= signal.rows() {
            let rows: Vec<Vec<f64>> = (start..start + cfg.window)
                .map(|r| signal.row(r).iter().map(|&v| v as f64).collect())
                .collect();
            let window = Window::from_rows(&rows)?;
            let features = self.catalog.extract(&window)?;
            writer.write_record(features.iter().map(|v| v.to_string()))?;
            written += 1;
            start += cfg.step;
        }
        writer.flush()?;

        tracing::info!("Wrote {} windows to '{}'", written, cfg.output.display());
        Ok(written)
    }
}
