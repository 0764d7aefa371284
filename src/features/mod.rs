// ============================================================
// Layer 3b — Feature Extraction
// ============================================================
// Pure functions that reduce a Window (samples × channels) to
// one scalar per channel, and the catalog that fixes which of
// them make up the model's input vector and in what order.
//
//   functions.rs — every feature function (active or not)
//   catalog.rs   — the versioned, immutable active feature list

pub mod functions;
pub mod catalog;

pub use catalog::{ExcludedFeature, FeatureCatalog};
pub use functions::{FeatureKind, FeatureParams};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    #[error("window has no samples or no channels")]
    EmptyWindow,

    #[error("window row {row} has {actual} channels, expected {expected}")]
    RaggedWindow { row: usize, expected: usize, actual: usize },

    #[error("feature '{feature}' needs at least {required} samples, window has {actual}")]
    TooFewSamples { feature: &'static str, required: usize, actual: usize },

    #[error("unknown feature '{0}'")]
    UnknownFeature(String),
}
