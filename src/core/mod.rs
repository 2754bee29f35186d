// core/mod.rs

// Data model of the drive-strategy subsystem: goals, poses and plans, the frame
// helpers operating on them, and the states a strategy moves through.

pub mod geometry;
pub mod localization;
pub mod state;

pub use geometry::{Frame, GlobalPlan, NavigationGoal, Pose2D, RobotPose};
pub use localization::{distance, normalize_angle, to_global, yaw_difference};
pub use state::{DrivePhase, StrategyState};
