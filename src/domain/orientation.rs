use serde::{Deserialize, Serialize};

/// Forearm orientation in radians. Pitch drives robot joint 3,
/// roll drives joint 4.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub pitch: f32,
    pub roll:  f32,
}

impl Orientation {
    pub fn new(pitch: f32, roll: f32) -> Self {
        Self { pitch, roll }
    }
}
