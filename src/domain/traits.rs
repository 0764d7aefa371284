// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Seams between the pipeline and the outside world:
//
//   RobotArm — the robot control surface. Consumed by the
//              wrist controller; the hardware driver lives
//              outside this crate.

// ─── RobotArm ─────────────────────────────────────────────────────────────────
/// Number of joints on the arm.
pub const NUM_JOINTS: usize = 7;

/// Joint positions (rad) and velocities (rad/s) reported by the arm.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointState {
    pub q:  [f64; NUM_JOINTS],
    pub dq: [f64; NUM_JOINTS],
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RobotError {
    /// The arm reported a fault that recovery may clear
    #[error("robot fault: {0}")]
    Fault(String),

    /// Connection lost or the arm refused the command outright
    #[error("fatal robot error: {0}")]
    Fatal(String),
}

/// The robot control surface.
pub trait RobotArm {
    fn state(&mut self) -> Result<JointState, RobotError>;

    fn recover_from_errors(&mut self) -> Result<(), RobotError>;

    /// Dispatch an absolute joint-space move
    fn move_joints(&mut self, target: [f64; NUM_JOINTS]) -> Result<(), RobotError>;
}
