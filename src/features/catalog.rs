// ============================================================
// Layer 3b — Feature Catalog
// ============================================================
// The ordered list of feature functions that defines the model
// input. Built once and never mutated; any change to the active
// list or its order must bump CATALOG_VERSION because trained
// checkpoints depend on the column layout.
//
// Column layout for one coefficient band (feature-major):
//
//   emg_0_f_mav, emg_1_f_mav, ..., emg_0_f_rms, emg_1_f_rms, ...

use crate::domain::window::Window;
use crate::features::{FeatureError, FeatureKind, FeatureParams};

pub const CATALOG_VERSION: u32 = 1;

/// A feature that is implemented but deliberately left out of
/// the model input, together with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedFeature {
    pub kind:      FeatureKind,
    pub rationale: &'static str,
}

#[derive(Debug, Clone)]
pub struct FeatureCatalog {
    version:  u32,
    active:   Vec<FeatureKind>,
    excluded: Vec<ExcludedFeature>,
    params:   FeatureParams,
}

impl FeatureCatalog {
    /// The catalog every shipped checkpoint was trained with.
    pub fn standard() -> Self {
        Self::with_params(FeatureParams::default())
    }

    pub fn with_params(params: FeatureParams) -> Self {
        use FeatureKind::*;

        let active = vec![
            Mav, Rms, Var, Myop, Damv, Dasdv, Max, Min, Wamp, Iasd, Iatd, Ieav, Ie,
        ];
        let excluded = vec![
            ExcludedFeature { kind: Iemg,  rationale: "redundant with mav (scaled by window length)" },
            ExcludedFeature { kind: Ssi,   rationale: "redundant with rms" },
            ExcludedFeature { kind: Wl,    rationale: "redundant with damv (scaled by window length)" },
            ExcludedFeature { kind: M2,    rationale: "largely redundant with damv" },
            ExcludedFeature { kind: Dvarv, rationale: "redundant with m2" },
            ExcludedFeature {
                kind:      Ialv,
                rationale: "non-finite for coefficients at or below -ialv_offset",
            },
        ];

        Self { version: CATALOG_VERSION, active, excluded, params }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn features(&self) -> &[FeatureKind] {
        &self.active
    }

    pub fn excluded(&self) -> &[ExcludedFeature] {
        &self.excluded
    }

    pub fn params(&self) -> &FeatureParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn contains(&self, kind: FeatureKind) -> bool {
        self.active.contains(&kind)
    }

    /// Shortest window every active feature accepts
    pub fn min_samples(&self) -> usize {
        self.active.iter().map(|k| k.min_samples()).max().unwrap_or(1)
    }

    /// Feature vector length for a single band
    pub fn input_width(&self, channels: usize) -> usize {
        channels * self.active.len()
    }

    /// Model input width once all coefficient bands are side by side
    pub fn model_input_width(&self, channels: usize, bands: usize) -> usize {
        self.input_width(channels) * bands
    }

    /// Header names for one band's feature file, in extraction order
    pub fn column_names(&self, channels: usize) -> Vec<String> {
        self.active
            .iter()
            .flat_map(|kind| {
                (0..channels).map(move |c| format!("emg_{c}_{}", kind.column_suffix()))
            })
            .collect()
    }

    /// Apply every active feature to the window and concatenate
    /// the per-channel results in catalog order.
    pub fn extract(&self, window: &Window) -> Result<Vec<f64>, FeatureError> {
        let mut out = Vec::with_capacity(self.input_width(window.channels()));
        for kind in &self.active {
            out.extend(kind.compute(window, &self.params)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(samples: usize, channels: usize) -> Window {
        let rows: Vec<Vec<f64>> = (0..samples)
            .map(|s| (0..channels).map(|c| ((s * channels + c) as f64 * 0.37).sin()).collect())
            .collect();
        Window::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_standard_catalog_order() {
        let names: Vec<&str> = FeatureCatalog::standard().features().iter().map(|k| k.name()).collect();
        assert_eq!(
            names,
            vec!["mav", "rms", "var", "myop", "damv", "dasdv", "max", "min",
                 "wamp", "iasd", "iatd", "ieav", "ie"]
        );
    }

    #[test]
    fn test_active_and_excluded_are_disjoint_and_complete() {
        let cat = FeatureCatalog::standard();
        for ex in cat.excluded() {
            assert!(!cat.contains(ex.kind));
            assert!(!ex.rationale.is_empty());
        }
        assert_eq!(cat.len() + cat.excluded().len(), FeatureKind::ALL.len());
    }

    #[test]
    fn test_widths_are_computed() {
        let cat = FeatureCatalog::standard();
        assert_eq!(cat.input_width(5), 65);
        assert_eq!(cat.model_input_width(5, 3), 195);
        assert_eq!(cat.min_samples(), 4);
    }

    #[test]
    fn test_extract_length_matches_column_names() {
        let cat = FeatureCatalog::standard();
        let w = window(8, 5);
        let features = cat.extract(&w).unwrap();
        assert_eq!(features.len(), cat.input_width(5));
        assert_eq!(cat.column_names(5).len(), features.len());
        assert!(features.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_extract_is_feature_major() {
        let cat = FeatureCatalog::standard();
        let w = window(6, 2);
        let features = cat.extract(&w).unwrap();
        let mav = FeatureKind::Mav.compute(&w, cat.params()).unwrap();
        let rms = FeatureKind::Rms.compute(&w, cat.params()).unwrap();
        assert_eq!(&features[0..2], mav.as_slice());
        assert_eq!(&features[2..4], rms.as_slice());

        let names = cat.column_names(2);
        assert_eq!(&names[0..4], &["emg_0_f_mav", "emg_1_f_mav", "emg_0_f_rms", "emg_1_f_rms"]);
    }

    #[test]
    fn test_extract_rejects_short_windows() {
        let cat = FeatureCatalog::standard();
        assert!(matches!(
            cat.extract(&window(3, 5)),
            Err(FeatureError::TooFewSamples { feature: "iatd", .. })
        ));
    }

    #[test]
    fn test_extract_is_deterministic() {
        let cat = FeatureCatalog::standard();
        let w = window(10, 5);
        assert_eq!(cat.extract(&w).unwrap(), cat.extract(&w).unwrap());
    }
}
