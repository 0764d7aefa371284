// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence concerns:
//
//   checkpoint.rs — model weights + metadata on disk, using
//                   Burn's named MessagePack recorder and JSON
//                   metadata so a loader can rebuild the model.
//
//   metrics.rs    — per-epoch training metrics appended to a
//                   CSV file for plotting learning curves.

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
