// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Each use case runs one workflow end to end by coordinating
// the other layers:
//
//   - No model maths here (Layer 5)
//   - No printing here (Layer 1)
//   - No CSV parsing here (Layers 4 and 6)

/// Feature files → trained checkpoint
pub mod train_use_case;

/// Checkpoint + feature files → error report
pub mod evaluate_use_case;

/// Coefficient CSV → per-window feature CSV
pub mod extract_use_case;
