//! Roboskills - drive strategies for mobile service robot navigation skills
//!
//! This library provides the drive-strategy layer used by navigation skills:
//! goal bookkeeping, the retrying goal chaser with its planning policies, and
//! the collaborator interfaces to the navigation server and localization.

#![warn(unused_extern_crates)]

pub mod core;
pub mod error;
pub mod interface;
pub mod navigation;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// Re-export commonly used items for easier access
pub use crate::core::{Frame, GlobalPlan, NavigationGoal, Pose2D, RobotPose, StrategyState};
pub use error::{DriveError, DriveResult};
pub use interface::{
    ActuatorError, CommandHandle, CommandStatus, NavResult, NavigationActuator, PositionSensor,
    SimulatedBase,
};
pub use navigation::{
    DriveStrategy, NearestToTarget, NoStrategy, RetryingGoalChaser, build_strategy,
    drive_to_completion,
};

/// Upper bound for the blocking waits inside one `execute()` cycle
pub const MAX_TIMEOUT_MS: u64 = 60_000;

/// Drive strategy variant selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Single direct command, no replanning
    #[serde(rename = "none")]
    NoStrategy,
    /// Retrying chaser walking back along the global plan
    NearestToTarget,
}

/// Actuator operation used for intermediate goals in map coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// `navigate_to_coordinate`
    Navigate,
    /// `navigate_to_interrupt`, preempting the running command
    Interrupt,
}

/// Drive strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Strategy built by `build_strategy`
    pub strategy: StrategyKind,
    /// Distance to the target below which the goal counts as reached (meters)
    pub max_distance_success: f64,
    /// Yaw error below which no final rotation is issued (radians)
    pub yaw_tolerance: f64,
    /// Replan ceiling of the retrying chaser
    pub replan: u32,
    /// Bounded wait for one pose read
    pub pose_timeout_ms: u64,
    /// Overall deadline of one plan request
    pub plan_timeout_ms: u64,
    /// Polling period while waiting for a plan
    pub plan_poll_ms: u64,
    pub dispatch: DispatchMode,
    /// Clear the costmaps when a drive attempt starts
    pub clear_costmap: bool,
    /// Report PATH_BLOCKED instead of ERROR when the server says so
    pub report_path_blocked: bool,
    /// Polling period of `drive_to_completion`
    pub poll_period_ms: u64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        DriveConfig {
            strategy: StrategyKind::NearestToTarget,
            max_distance_success: 0.2,
            yaw_tolerance: 0.1,
            replan: 3,
            pose_timeout_ms: 1000,
            plan_timeout_ms: 5000,
            plan_poll_ms: 10,
            dispatch: DispatchMode::Navigate,
            clear_costmap: true,
            report_path_blocked: true,
            poll_period_ms: 50,
        }
    }
}

impl DriveConfig {
    /// Parses and validates a YAML document
    pub fn from_yaml_str(yaml: &str) -> DriveResult<Self> {
        let config: DriveConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a YAML configuration file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> DriveResult<Self> {
        let config_file = std::fs::File::open(path.as_ref())?;
        let config: DriveConfig = serde_yaml::from_reader(config_file)?;
        config.validate()?;
        log::info!("Loaded drive configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Rejects values the strategies cannot work with
    pub fn validate(&self) -> DriveResult<()> {
        if !(self.max_distance_success > 0.0) {
            return Err(DriveError::Config(format!(
                "max_distance_success must be positive, got {}",
                self.max_distance_success
            )));
        }
        if !(self.yaw_tolerance >= 0.0) {
            return Err(DriveError::Config(format!(
                "yaw_tolerance must not be negative, got {}",
                self.yaw_tolerance
            )));
        }
        if self.replan == 0 {
            return Err(DriveError::Config("replan must be at least 1".to_string()));
        }
        if self.plan_poll_ms == 0 {
            return Err(DriveError::Config("plan_poll_ms must be at least 1".to_string()));
        }
        for (name, value) in [
            ("pose_timeout_ms", self.pose_timeout_ms),
            ("plan_timeout_ms", self.plan_timeout_ms),
        ] {
            if value == 0 || value > MAX_TIMEOUT_MS {
                return Err(DriveError::Config(format!(
                    "{} must be within 1..={}, got {}",
                    name, MAX_TIMEOUT_MS, value
                )));
            }
        }
        Ok(())
    }

    pub fn pose_timeout(&self) -> Duration {
        Duration::from_millis(self.pose_timeout_ms)
    }

    pub fn plan_timeout(&self) -> Duration {
        Duration::from_millis(self.plan_timeout_ms)
    }

    pub fn plan_poll(&self) -> Duration {
        Duration::from_millis(self.plan_poll_ms)
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_period_ms)
    }
}
