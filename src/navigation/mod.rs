//! Drive strategies for navigation skills
//!
//! A navigation skill calls `init(goal)` once and then polls `execute()` until
//! it reports a terminal state. Each cycle issues at most one drive command and
//! always classifies the outcome of the previous one first.
//!
//! - `RetryingGoalChaser` owns the retry/replan loop shared by the planning
//!   variants; `NearestToTarget` is its plan walk-back policy
//! - `NoStrategy` sends a single direct command

mod controller;
mod direct;
mod planner;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{error, info, warn};

pub use controller::{GoalPolicy, PlanContext, RetryingGoalChaser};
pub use direct::NoStrategy;
pub use planner::{NearestToTarget, waypoint_index};

use crate::core::{Frame, NavigationGoal, RobotPose, StrategyState, to_global};
use crate::error::{DriveError, DriveResult};
use crate::interface::{CommandHandle, NavResult, NavigationActuator, PositionSensor};
use crate::{DispatchMode, DriveConfig, StrategyKind};

/// Polled drive behaviour consumed by navigation skills
pub trait DriveStrategy: Send {
    /// Prepares a drive attempt towards `goal`.
    /// Returns false if the goal cannot be driven to; `execute()` must not be
    /// called in that case.
    fn init(&mut self, goal: NavigationGoal) -> bool;

    /// Advances the drive attempt without blocking for the drive itself
    fn execute(&mut self) -> StrategyState;

    /// Aborts the in-flight command, if any. Safe to call repeatedly.
    fn reset(&mut self);

    fn name(&self) -> &'static str;
}

/// Builds the strategy named in `config`
pub fn build_strategy(
    config: &DriveConfig,
    actuator: Arc<dyn NavigationActuator>,
    sensor: Arc<dyn PositionSensor>,
) -> Box<dyn DriveStrategy> {
    match config.strategy {
        StrategyKind::NoStrategy => Box::new(NoStrategy::new(actuator, sensor, config.clone())),
        StrategyKind::NearestToTarget => Box::new(RetryingGoalChaser::new(
            actuator,
            sensor,
            config.clone(),
            NearestToTarget,
        )),
    }
}

/// Runs one drive attempt the way a navigation skill does: init, then poll
/// every `poll_period` until terminal. Gives up with ERROR after `max_cycles`
/// polls, aborting the running command.
pub fn drive_to_completion(
    strategy: &mut dyn DriveStrategy,
    goal: NavigationGoal,
    poll_period: Duration,
    max_cycles: usize,
) -> StrategyState {
    if !strategy.init(goal) {
        error!("{} rejected goal {:?}", strategy.name(), goal);
        return StrategyState::Error;
    }

    for cycle in 0..max_cycles {
        let state = strategy.execute();
        if state.is_terminal() {
            info!("{} finished with {} after {} cycles", strategy.name(), state, cycle + 1);
            return state;
        }
        thread::sleep(poll_period);
    }

    warn!("{} did not finish within {} cycles", strategy.name(), max_cycles);
    strategy.reset();
    StrategyState::Error
}

/// Reads the latest pose, retrying once on timeout
pub(crate) fn read_pose_with_retry(
    sensor: &dyn PositionSensor,
    timeout: Duration,
) -> Option<RobotPose> {
    sensor.read_last(timeout).or_else(|| {
        warn!("No robot pose within {:?}, retrying once", timeout);
        sensor.read_last(timeout)
    })
}

/// Validates `goal`, rewrites it into the map frame and stamps the success
/// tolerance. GLOBAL goals keep their coordinates.
pub(crate) fn prepare_goal(
    goal: NavigationGoal,
    sensor: &dyn PositionSensor,
    config: &DriveConfig,
) -> DriveResult<NavigationGoal> {
    if !(goal.x.is_finite() && goal.y.is_finite() && goal.yaw.is_finite()) {
        return Err(DriveError::Config(format!("goal is not finite: {:?}", goal)));
    }

    let global = match goal.frame {
        Frame::Global => goal,
        Frame::Local => {
            let robot = read_pose_with_retry(sensor, config.pose_timeout())
                .ok_or(DriveError::PoseUnavailable)?;
            to_global(&goal, &robot)
        }
    };

    Ok(global.with_tolerance(config.max_distance_success))
}

/// Sends `goal` to the actuator operation matching its frame
pub(crate) fn dispatch_goal(
    actuator: &dyn NavigationActuator,
    goal: &NavigationGoal,
    mode: DispatchMode,
) -> CommandHandle<NavResult> {
    match (goal.frame, mode) {
        (Frame::Global, DispatchMode::Navigate) => actuator.navigate_to_coordinate(goal),
        (Frame::Global, DispatchMode::Interrupt) => actuator.navigate_to_interrupt(goal),
        (Frame::Local, _) => actuator.navigate_relative(goal),
    }
}
