// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types shared by every other layer.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only structs, enums and traits
//
//   window.rs       — a multichannel EMG window (samples × channels)
//   orientation.rs  — forearm pitch/roll pair
//   band.rs         — wavelet coefficient band labels (cA2, cD1, cD2)
//   traits.rs       — seams implemented by the outer layers

/// Multichannel signal window fed to the feature functions
pub mod window;

/// Forearm orientation (pitch, roll)
pub mod orientation;

/// Wavelet coefficient bands
pub mod band;

/// Core abstractions (traits) that other layers implement
pub mod traits;
