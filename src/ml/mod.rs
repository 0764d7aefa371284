// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model code lives here:
//
//   model.rs     — bidirectional LSTM + linear head
//   trainer.rs   — Adam training loop and its state machine
//   estimator.rs — runs a trained model (estimation, evaluation)
//   backend.rs   — wgpu / ndarray backend selection

/// Bidirectional LSTM orientation regressor
pub mod model;

/// Training loop with cancellation and divergence reporting
pub mod trainer;

/// Inference on trained weights
pub mod estimator;

/// Device / backend selection
pub mod backend;
