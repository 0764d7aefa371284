// ============================================================
// Layer 7 — Robot Wrist Control
// ============================================================
// Turns an estimated (pitch, roll) into a bounded joint-space
// move on the robot control surface (domain::traits::RobotArm).
// The hardware driver itself is an external collaborator; this
// layer only owns the clamping and the fault classification.

pub mod wrist;
