// ============================================================
// Layer 7 — Wrist Controller
// ============================================================
// Joint 3 follows pitch (elbow), joint 4 follows roll (forearm).
// Each call may move either joint by at most
// `joint_change_limit_rad` from its current position.
//
// Move attempt:
//   1. read joint state, warn if the arm is still moving
//   2. resolve the target (absolute, or relative to current)
//   3. clamp each wrist joint to curr ± limit
//   4. recover from any fault state
//   5. dispatch the move
//
// Failures come back as a MoveOutcome instead of being
// swallowed: the caller decides whether a fault is logged and
// skipped or escalated.

use serde::{Deserialize, Serialize};

use crate::domain::orientation::Orientation;
use crate::domain::traits::{RobotArm, RobotError, NUM_JOINTS};

pub const PITCH_JOINT: usize = 3;
pub const ROLL_JOINT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WristConfig {
    /// Largest change per call for each wrist joint (rad)
    pub joint_change_limit_rad: f64,
    /// Any joint velocity above this means the arm is still moving (rad/s)
    pub moving_threshold:       f64,
}

impl Default for WristConfig {
    fn default() -> Self {
        Self {
            joint_change_limit_rad: 0.05,
            moving_threshold:       0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The move was sent; holds the commanded joint positions
    Dispatched { joints: [f64; NUM_JOINTS] },
    /// The arm faulted; a later attempt may succeed
    RetryableFault(String),
    /// The arm cannot be commanded
    FatalFault(String),
}

impl MoveOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, MoveOutcome::Dispatched { .. })
    }
}

impl From<RobotError> for MoveOutcome {
    fn from(e: RobotError) -> Self {
        match e {
            RobotError::Fault(msg) => MoveOutcome::RetryableFault(msg),
            RobotError::Fatal(msg) => MoveOutcome::FatalFault(msg),
        }
    }
}

pub struct WristController<R: RobotArm> {
    robot:  R,
    config: WristConfig,
}

impl<R: RobotArm> WristController<R> {
    pub fn new(robot: R, config: WristConfig) -> Self {
        Self { robot, config }
    }

    pub fn robot(&self) -> &R {
        &self.robot
    }

    /// Clamp `new` to within the per-call limit of `curr`.
    pub fn limit_joint_motion(&self, curr: f64, new: f64) -> f64 {
        let limit = self.config.joint_change_limit_rad;
        new.clamp(curr - limit, curr + limit)
    }

    /// Move the wrist towards `target`. With `relative`, the
    /// target is added to the current joint angles.
    pub fn move_wrist(&mut self, target: Orientation, relative: bool) -> MoveOutcome {
        let state = match self.robot.state() {
            Ok(s)  => s,
            Err(e) => return e.into(),
        };
        if state.dq.iter().any(|&dq| dq > self.config.moving_threshold) {
            tracing::warn!("Robot is currently moving");
        }

        let mut pitch = target.pitch as f64;
        let mut roll  = target.roll as f64;
        if relative {
            pitch += state.q[PITCH_JOINT];
            roll  += state.q[ROLL_JOINT];
        }

        let mut joints = state.q;
        joints[PITCH_JOINT] = self.limit_joint_motion(state.q[PITCH_JOINT], pitch);
        joints[ROLL_JOINT]  = self.limit_joint_motion(state.q[ROLL_JOINT], roll);

        let dispatched = self
            .robot
            .recover_from_errors()
            .and_then(|_| self.robot.move_joints(joints));

        match dispatched {
            Ok(()) => MoveOutcome::Dispatched { joints },
            Err(e) => {
                tracing::warn!("Wrist move failed: {}", e);
                e.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::traits::JointState;

    #[derive(Default)]
    struct FakeArm {
        state:      JointState,
        moves:      Vec<[f64; NUM_JOINTS]>,
        recoveries: usize,
        move_error: Option<RobotError>,
    }

    impl RobotArm for FakeArm {
        fn state(&mut self) -> Result<JointState, RobotError> {
            Ok(self.state)
        }

        fn recover_from_errors(&mut self) -> Result<(), RobotError> {
            self.recoveries += 1;
            Ok(())
        }

        fn move_joints(&mut self, target: [f64; NUM_JOINTS]) -> Result<(), RobotError> {
            if let Some(e) = self.move_error.clone() {
                return Err(e);
            }
            self.moves.push(target);
            self.state.q = target;
            Ok(())
        }
    }

    fn controller(arm: FakeArm) -> WristController<FakeArm> {
        WristController::new(arm, WristConfig::default())
    }

    #[test]
    fn test_limit_joint_motion() {
        let c = controller(FakeArm::default());
        assert!((c.limit_joint_motion(1.0, 2.0) - 1.05).abs() < 1e-12);
        assert!((c.limit_joint_motion(1.0, 0.0) - 0.95).abs() < 1e-12);
        assert_eq!(c.limit_joint_motion(1.0, 1.02), 1.02);
    }

    #[test]
    fn test_absolute_move_is_clamped_and_leaves_other_joints() {
        let mut arm = FakeArm::default();
        arm.state.q = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];
        let mut c = controller(arm);

        let outcome = c.move_wrist(Orientation::new(1.0, 0.49), false);
        let MoveOutcome::Dispatched { joints } = outcome else { panic!("expected dispatch") };
        assert!((joints[PITCH_JOINT] - 0.45).abs() < 1e-6);
        assert!((joints[ROLL_JOINT] - 0.49).abs() < 1e-6);
        assert_eq!(joints[0], 0.1);
        assert_eq!(joints[6], 0.7);
        assert_eq!(c.robot().recoveries, 1);
    }

    #[test]
    fn test_relative_move_adds_to_current_angles() {
        let mut arm = FakeArm::default();
        arm.state.q[PITCH_JOINT] = 0.5;
        arm.state.q[ROLL_JOINT]  = -0.5;
        let mut c = controller(arm);

        let outcome = c.move_wrist(Orientation::new(0.01, -0.02), true);
        let MoveOutcome::Dispatched { joints } = outcome else { panic!("expected dispatch") };
        assert!((joints[PITCH_JOINT] - 0.51).abs() < 1e-6);
        assert!((joints[ROLL_JOINT] + 0.52).abs() < 1e-6);
    }

    #[test]
    fn test_faults_are_classified_not_swallowed() {
        let arm = FakeArm { move_error: Some(RobotError::Fault("reflex".into())), ..FakeArm::default() };
        let mut c = controller(arm);
        assert_eq!(
            c.move_wrist(Orientation::default(), false),
            MoveOutcome::RetryableFault("reflex".into())
        );

        let arm = FakeArm { move_error: Some(RobotError::Fatal("disconnected".into())), ..FakeArm::default() };
        let mut c = controller(arm);
        let outcome = c.move_wrist(Orientation::default(), false);
        assert!(matches!(outcome, MoveOutcome::FatalFault(_)));
        assert!(!outcome.is_dispatched());
    }
}
