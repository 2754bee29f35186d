// src/interface/sensor.rs
// Robot pose source consumed by the drive strategies.

use std::time::Duration;

use crate::core::RobotPose;

/// Latest localization estimate of the base
#[cfg_attr(test, mockall::automock)]
pub trait PositionSensor: Send + Sync {
    /// Returns the most recent pose, waiting up to `timeout` for one to arrive.
    /// `None` if nothing was received in time.
    fn read_last(&self, timeout: Duration) -> Option<RobotPose>;
}
