// src/error.rs
// Error type of the drive-strategy subsystem.

use std::time::Duration;

use thiserror::Error;

use crate::interface::ActuatorError;

/// Failures inside a drive attempt or while loading configuration.
///
/// Strategies fold these into a `StrategyState` at their public boundary;
/// they only escape through configuration loading.
#[derive(Debug, Error)]
pub enum DriveError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Actuator(#[from] ActuatorError),
    #[error("plan request did not resolve within {0:?}")]
    PlanTimeout(Duration),
    #[error("command was dropped by the navigation actuator before resolving")]
    CommandAbandoned,
    #[error("robot pose unavailable")]
    PoseUnavailable,
}

pub type DriveResult<T> = Result<T, DriveError>;
