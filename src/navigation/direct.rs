// src/navigation/direct.rs
// Drive strategy without replanning: one command straight to the goal.

use std::mem;
use std::sync::Arc;

use log::{error, info, warn};

use super::{DriveStrategy, dispatch_goal, prepare_goal};
use crate::DriveConfig;
use crate::core::{DrivePhase, NavigationGoal, StrategyState};
use crate::interface::{CommandStatus, NavResult, NavigationActuator, PositionSensor};

/// Sends the goal once and reports how that single command ended.
/// No retries and no final yaw correction.
pub struct NoStrategy {
    actuator: Arc<dyn NavigationActuator>,
    sensor: Arc<dyn PositionSensor>,
    config: DriveConfig,
    target: Option<NavigationGoal>,
    phase: DrivePhase,
}

impl NoStrategy {
    pub fn new(
        actuator: Arc<dyn NavigationActuator>,
        sensor: Arc<dyn PositionSensor>,
        config: DriveConfig,
    ) -> Self {
        NoStrategy {
            actuator,
            sensor,
            config,
            target: None,
            phase: DrivePhase::Idle,
        }
    }

    pub fn target_goal(&self) -> Option<&NavigationGoal> {
        self.target.as_ref()
    }

    pub fn has_pending_command(&self) -> bool {
        self.phase.has_pending_command()
    }

    fn finish(&mut self, state: StrategyState) -> StrategyState {
        info!("NoStrategy: drive ended with {}", state);
        self.phase = DrivePhase::Finished(state);
        state
    }
}

impl DriveStrategy for NoStrategy {
    fn init(&mut self, goal: NavigationGoal) -> bool {
        if self.phase.has_pending_command() {
            self.reset();
        }
        match prepare_goal(goal, self.sensor.as_ref(), &self.config) {
            Ok(target) => {
                self.target = Some(target);
                self.phase = DrivePhase::AwaitingPlan;
                true
            }
            Err(e) => {
                error!("Cannot start drive attempt: {}", e);
                self.target = None;
                self.phase = DrivePhase::Idle;
                false
            }
        }
    }

    fn execute(&mut self) -> StrategyState {
        let Some(target) = self.target else {
            error!("execute() without a target goal, init() was not called or failed");
            return StrategyState::Error;
        };

        match mem::replace(&mut self.phase, DrivePhase::Idle) {
            DrivePhase::AwaitingPlan => {
                info!("NoStrategy: driving to ({:.3}, {:.3})", target.x, target.y);
                let handle = dispatch_goal(self.actuator.as_ref(), &target, self.config.dispatch);
                self.phase = DrivePhase::Driving(handle);
                StrategyState::NotFinished
            }
            DrivePhase::Driving(mut handle) => match handle.poll() {
                CommandStatus::Pending => {
                    self.phase = DrivePhase::Driving(handle);
                    StrategyState::NotFinished
                }
                CommandStatus::Ready(NavResult::Success) => self.finish(StrategyState::Success),
                CommandStatus::Ready(NavResult::PathBlocked) => {
                    self.finish(StrategyState::ReachedPartly)
                }
                CommandStatus::Ready(result) => {
                    error!("Drive command failed with {:?}", result);
                    self.finish(StrategyState::Error)
                }
                CommandStatus::Abandoned => {
                    error!("Drive command dropped without a result");
                    self.finish(StrategyState::Error)
                }
            },
            DrivePhase::Finished(state) => {
                self.phase = DrivePhase::Finished(state);
                state
            }
            phase => {
                self.phase = phase;
                StrategyState::Error
            }
        }
    }

    fn reset(&mut self) {
        if self.phase.has_pending_command() {
            if let Err(e) = self.actuator.manual_stop() {
                warn!("Stopping the base failed: {}", e);
            }
        }
        self.phase = DrivePhase::Idle;
        self.target = None;
    }

    fn name(&self) -> &'static str {
        "NoStrategy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Frame, RobotPose};
    use crate::interface::{CommandHandle, MockNavigationActuator, MockPositionSensor};
    use rstest::rstest;

    fn strategy(actuator: MockNavigationActuator, sensor: MockPositionSensor) -> NoStrategy {
        NoStrategy::new(Arc::new(actuator), Arc::new(sensor), DriveConfig::default())
    }

    #[rstest]
    #[case(NavResult::Success, StrategyState::Success)]
    #[case(NavResult::PathBlocked, StrategyState::ReachedPartly)]
    #[case(NavResult::Cancelled, StrategyState::Error)]
    #[case(NavResult::EmergencyStopped, StrategyState::Error)]
    #[case(NavResult::UnknownError, StrategyState::Error)]
    fn maps_single_command_outcome(#[case] result: NavResult, #[case] expected: StrategyState) {
        let mut actuator = MockNavigationActuator::new();
        actuator
            .expect_navigate_to_coordinate()
            .times(1)
            .returning(move |_| CommandHandle::resolved(result));
        actuator.expect_clear_costmap().never();
        actuator.expect_get_plan().never();
        let mut strategy = strategy(actuator, MockPositionSensor::new());

        assert!(strategy.init(NavigationGoal::global(1.0, 1.0, 0.0)));
        assert_eq!(strategy.execute(), StrategyState::NotFinished);
        assert_eq!(strategy.execute(), expected);
        assert_eq!(strategy.execute(), expected);
    }

    #[test]
    fn waits_for_pending_command() {
        let (completer, handle) = CommandHandle::pending();
        let mut actuator = MockNavigationActuator::new();
        actuator
            .expect_navigate_to_coordinate()
            .times(1)
            .return_once(move |_| handle);
        let mut strategy = strategy(actuator, MockPositionSensor::new());

        assert!(strategy.init(NavigationGoal::global(1.0, 1.0, 0.0)));
        assert_eq!(strategy.execute(), StrategyState::NotFinished);
        assert_eq!(strategy.execute(), StrategyState::NotFinished);
        assert!(strategy.has_pending_command());
        completer.complete(NavResult::Success);
        assert_eq!(strategy.execute(), StrategyState::Success);
    }

    #[test]
    fn local_goal_is_sent_in_map_coordinates() {
        let mut sensor = MockPositionSensor::new();
        sensor
            .expect_read_last()
            .returning(|_| Some(RobotPose::new(1.0, 0.0, 0.0, 0)));
        let mut actuator = MockNavigationActuator::new();
        actuator
            .expect_navigate_to_coordinate()
            .times(1)
            .withf(|goal| goal.frame == Frame::Global && (goal.x - 2.0).abs() < 1e-9)
            .returning(|_| CommandHandle::resolved(NavResult::Success));
        let mut strategy = strategy(actuator, sensor);

        assert!(strategy.init(NavigationGoal::local(1.0, 0.0, 0.0)));
        assert_eq!(strategy.execute(), StrategyState::NotFinished);
        assert_eq!(strategy.execute(), StrategyState::Success);
    }

    #[test]
    fn reset_stops_pending_command() {
        let (_completer, handle) = CommandHandle::pending();
        let mut actuator = MockNavigationActuator::new();
        actuator
            .expect_navigate_to_coordinate()
            .return_once(move |_| handle);
        actuator.expect_manual_stop().times(1).returning(|| Ok(()));
        let mut strategy = strategy(actuator, MockPositionSensor::new());

        assert!(strategy.init(NavigationGoal::global(1.0, 1.0, 0.0)));
        assert_eq!(strategy.execute(), StrategyState::NotFinished);
        strategy.reset();
        strategy.reset();
        assert_eq!(strategy.execute(), StrategyState::Error);
    }

    #[test]
    fn execute_without_init_is_an_error() {
        let mut strategy = strategy(MockNavigationActuator::new(), MockPositionSensor::new());
        assert_eq!(strategy.execute(), StrategyState::Error);
    }
}
