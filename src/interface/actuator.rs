// src/interface/actuator.rs
// Navigation capability consumed by the drive strategies.

use thiserror::Error;

use super::command::CommandHandle;
use crate::core::{GlobalPlan, NavigationGoal, RobotPose};

/// Outcome of a drive command as reported by the navigation server
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavResult {
    Success,
    PathBlocked,
    Cancelled,
    Superseded,
    EmergencyStopped,
    Timeout,
    UnknownError,
}

/// Failures reported synchronously by the navigation collaborator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActuatorError {
    /// The collaborator does not offer this operation
    #[error("operation not supported by the navigation actuator")]
    Unsupported,
    #[error("navigation actuator failure: {0}")]
    Failed(String),
}

/// Drives the mobile base.
///
/// Drive operations return immediately with a handle that resolves once the
/// navigation server finishes. Only one drive command is expected to be in
/// flight per caller.
#[cfg_attr(test, mockall::automock)]
pub trait NavigationActuator: Send + Sync {
    /// Drives to a goal in map coordinates
    fn navigate_to_coordinate(&self, goal: &NavigationGoal) -> CommandHandle<NavResult>;

    /// Drives relative to the current base pose
    fn navigate_relative(&self, goal: &NavigationGoal) -> CommandHandle<NavResult>;

    /// Drives to a goal in map coordinates, preempting whatever is running
    fn navigate_to_interrupt(&self, goal: &NavigationGoal) -> CommandHandle<NavResult>;

    /// Asks the planner for a path from `from` to `goal` without moving.
    /// Collaborators without asynchronous planning return `Unsupported`.
    fn get_plan(
        &self,
        _goal: &NavigationGoal,
        _from: &RobotPose,
    ) -> Result<CommandHandle<GlobalPlan>, ActuatorError> {
        Err(ActuatorError::Unsupported)
    }

    /// Synchronous planning from the current base pose
    fn try_goal(&self, _goal: &NavigationGoal) -> Result<GlobalPlan, ActuatorError> {
        Err(ActuatorError::Unsupported)
    }

    /// Stops whatever motion is running
    fn manual_stop(&self) -> Result<(), ActuatorError>;

    /// Resets the obstacle layers of the costmaps
    fn clear_costmap(&self) -> Result<(), ActuatorError>;
}
