//! Collaborator interfaces of the drive strategies
//!
//! This module defines the capabilities a drive strategy consumes:
//! - `NavigationActuator` to drive, plan and stop the base
//! - `PositionSensor` to read the latest robot pose
//! - `CommandHandle`, the pollable handle every drive command returns
//!
//! `SimulatedBase` implements both capabilities in-process.

mod actuator;
mod command;
mod sensor;
pub mod sim;

pub use actuator::*;
pub use command::*;
pub use sensor::*;
pub use sim::SimulatedBase;
