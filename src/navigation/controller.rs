// src/navigation/controller.rs
// Retrying goal chaser: drives towards a target through intermediate goals
// picked by a policy, replanning after every finished command, and finishes
// with an in-place rotation onto the target yaw.

use std::mem;
use std::sync::Arc;

use log::{debug, error, info, warn};

use super::{DriveStrategy, dispatch_goal, prepare_goal, read_pose_with_retry};
use crate::DriveConfig;
use crate::core::{DrivePhase, NavigationGoal, RobotPose, StrategyState, distance, yaw_difference};
use crate::error::DriveResult;
use crate::interface::{CommandStatus, NavResult, NavigationActuator, PositionSensor};

/// Inputs available to a policy when it picks the next intermediate goal
pub struct PlanContext<'a> {
    pub actuator: &'a dyn NavigationActuator,
    /// Pose read at the start of this cycle
    pub robot: &'a RobotPose,
    /// Target of the drive attempt, in map coordinates
    pub target: &'a NavigationGoal,
    /// Attempt counter, 1 for the first command of a drive attempt
    pub take_goal: u32,
    pub config: &'a DriveConfig,
}

/// Variant-specific part of the chaser
pub trait GoalPolicy: Send {
    fn name(&self) -> &'static str;

    /// Next intermediate goal, or `None` when the chaser should stop driving
    /// and decide between success and failure.
    fn find_best_goal(&mut self, ctx: &PlanContext) -> DriveResult<Option<NavigationGoal>>;

    /// Whether `robot` is close enough to `target` to count as arrived
    fn check_success(&self, robot: &RobotPose, target: &NavigationGoal, config: &DriveConfig) -> bool {
        distance(&robot.pose, &target.pose()) < config.max_distance_success
    }
}

/// Shared retry/replan loop of the planning drive strategies
pub struct RetryingGoalChaser<P: GoalPolicy> {
    actuator: Arc<dyn NavigationActuator>,
    sensor: Arc<dyn PositionSensor>,
    config: DriveConfig,
    policy: P,
    target: Option<NavigationGoal>,
    robot_pos: Option<RobotPose>,
    take_goal: u32,
    phase: DrivePhase,
}

impl<P: GoalPolicy> RetryingGoalChaser<P> {
    pub fn new(
        actuator: Arc<dyn NavigationActuator>,
        sensor: Arc<dyn PositionSensor>,
        config: DriveConfig,
        policy: P,
    ) -> Self {
        RetryingGoalChaser {
            actuator,
            sensor,
            config,
            policy,
            target: None,
            robot_pos: None,
            take_goal: 0,
            phase: DrivePhase::Idle,
        }
    }

    /// Number of the next intermediate goal attempt
    pub fn take_goal(&self) -> u32 {
        self.take_goal
    }

    /// Target of the current drive attempt, in map coordinates after `init`
    pub fn target_goal(&self) -> Option<&NavigationGoal> {
        self.target.as_ref()
    }

    /// Pose read during the last cycle
    pub fn last_pose(&self) -> Option<&RobotPose> {
        self.robot_pos.as_ref()
    }

    pub fn has_pending_command(&self) -> bool {
        self.phase.has_pending_command()
    }

    pub fn phase_name(&self) -> &'static str {
        self.phase.name()
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    fn finish(&mut self, state: StrategyState) -> StrategyState {
        match state {
            StrategyState::Success => info!("{}: target reached", self.policy.name()),
            _ => warn!("{}: drive attempt ended with {}", self.policy.name(), state),
        }
        self.phase = DrivePhase::Finished(state);
        state
    }

    fn refresh_pose(&mut self) -> Option<RobotPose> {
        self.robot_pos = read_pose_with_retry(self.sensor.as_ref(), self.config.pose_timeout());
        self.robot_pos
    }

    /// Classifies a finished drive command. `None` means keep chasing.
    fn classify_drive_result(&mut self, result: NavResult) -> Option<StrategyState> {
        match result {
            NavResult::Success => {
                debug!("Intermediate goal reached, replanning");
                None
            }
            NavResult::PathBlocked if self.config.report_path_blocked => {
                Some(self.finish(StrategyState::PathBlocked))
            }
            other => {
                error!("Drive command failed with {:?}", other);
                Some(self.finish(StrategyState::Error))
            }
        }
    }

    /// Issues the final rotation, or reports success if none is needed
    fn correct_yaw(&mut self, target: &NavigationGoal) -> StrategyState {
        let Some(robot) = self.refresh_pose() else {
            error!("Robot pose lost before yaw correction");
            return self.finish(StrategyState::Error);
        };
        if !self.policy.check_success(&robot, target, &self.config) {
            return self.left_goal_area("before yaw correction");
        }

        let yaw_diff = yaw_difference(target.yaw, robot.yaw());
        if yaw_diff.abs() < self.config.yaw_tolerance {
            return self.finish(StrategyState::Success);
        }

        info!("Correcting yaw by {:.3} rad", yaw_diff);
        let handle = self.actuator.navigate_relative(&NavigationGoal::rotation(yaw_diff));
        self.phase = DrivePhase::CorrectingYaw(handle);
        StrategyState::NotFinished
    }

    /// Re-validates the position once the final rotation has finished
    fn confirm_arrival(&mut self, target: &NavigationGoal) -> StrategyState {
        let Some(robot) = self.refresh_pose() else {
            error!("Robot pose lost after yaw correction");
            return self.finish(StrategyState::Error);
        };
        if self.policy.check_success(&robot, target, &self.config) {
            self.finish(StrategyState::Success)
        } else {
            self.left_goal_area("during yaw correction")
        }
    }

    /// A fresh pose fell outside the tolerance after arrival was detected.
    /// Replanning uses up an attempt so the replan ceiling still bounds the run.
    fn left_goal_area(&mut self, when: &str) -> StrategyState {
        if self.take_goal >= self.config.replan {
            error!(
                "Robot left the goal area {} and all {} attempts are used",
                when, self.config.replan
            );
            return self.finish(StrategyState::Error);
        }
        debug!("Robot left the goal area {}, replanning", when);
        self.take_goal += 1;
        self.phase = DrivePhase::AwaitingPlan;
        StrategyState::NotFinished
    }

    fn plan_and_drive(&mut self, target: &NavigationGoal) -> StrategyState {
        let Some(robot) = self.refresh_pose() else {
            error!("Robot pose unavailable");
            return self.finish(StrategyState::Error);
        };

        let ctx = PlanContext {
            actuator: self.actuator.as_ref(),
            robot: &robot,
            target,
            take_goal: self.take_goal,
            config: &self.config,
        };
        let next = match self.policy.find_best_goal(&ctx) {
            Ok(next) => next,
            Err(e) => {
                error!("Finding the next goal failed: {}", e);
                return self.finish(StrategyState::Error);
            }
        };

        let arrived = self.policy.check_success(&robot, target, &self.config);
        match next {
            _ if arrived => self.correct_yaw(target),
            None => {
                error!(
                    "No further goal and target still {:.3} m away",
                    distance(&robot.pose, &target.pose())
                );
                self.finish(StrategyState::Error)
            }
            Some(goal) => {
                info!(
                    "Driving to intermediate goal ({:.3}, {:.3}), attempt {}",
                    goal.x, goal.y, self.take_goal
                );
                let handle = dispatch_goal(self.actuator.as_ref(), &goal, self.config.dispatch);
                self.phase = DrivePhase::Driving(handle);
                self.take_goal += 1;
                StrategyState::NotFinished
            }
        }
    }
}

impl<P: GoalPolicy> DriveStrategy for RetryingGoalChaser<P> {
    fn init(&mut self, goal: NavigationGoal) -> bool {
        if self.phase.has_pending_command() {
            warn!("init() while a command is in flight, stopping it");
            self.reset();
        }

        let target = match prepare_goal(goal, self.sensor.as_ref(), &self.config) {
            Ok(target) => target,
            Err(e) => {
                error!("Cannot start drive attempt: {}", e);
                self.target = None;
                self.phase = DrivePhase::Idle;
                return false;
            }
        };

        if self.config.clear_costmap {
            if let Err(e) = self.actuator.clear_costmap() {
                warn!("Clearing the costmap failed: {}", e);
            }
        }

        info!(
            "{}: new target ({:.3}, {:.3}, {:.3})",
            self.policy.name(),
            target.x,
            target.y,
            target.yaw
        );
        self.target = Some(target);
        self.robot_pos = None;
        self.take_goal = 1;
        self.phase = DrivePhase::AwaitingPlan;
        true
    }

    fn execute(&mut self) -> StrategyState {
        let Some(target) = self.target else {
            error!("execute() without a target goal, init() was not called or failed");
            return StrategyState::Error;
        };

        match mem::replace(&mut self.phase, DrivePhase::AwaitingPlan) {
            DrivePhase::Idle => {
                self.phase = DrivePhase::Idle;
                return StrategyState::Error;
            }
            DrivePhase::Finished(state) => {
                self.phase = DrivePhase::Finished(state);
                return state;
            }
            DrivePhase::Driving(mut handle) => match handle.poll() {
                CommandStatus::Pending => {
                    self.phase = DrivePhase::Driving(handle);
                    return StrategyState::NotFinished;
                }
                CommandStatus::Ready(result) => {
                    if let Some(state) = self.classify_drive_result(result) {
                        return state;
                    }
                }
                CommandStatus::Abandoned => {
                    error!("Drive command dropped without a result");
                    return self.finish(StrategyState::Error);
                }
            },
            DrivePhase::CorrectingYaw(mut handle) => {
                match handle.poll() {
                    CommandStatus::Pending => {
                        self.phase = DrivePhase::CorrectingYaw(handle);
                        return StrategyState::NotFinished;
                    }
                    CommandStatus::Ready(NavResult::Success) => {}
                    CommandStatus::Ready(result) => warn!("Yaw correction ended with {:?}", result),
                    CommandStatus::Abandoned => warn!("Yaw correction dropped without a result"),
                }
                return self.confirm_arrival(&target);
            }
            DrivePhase::AwaitingPlan => {}
        }

        self.plan_and_drive(&target)
    }

    fn reset(&mut self) {
        if self.phase.has_pending_command() {
            info!("{}: aborting running command", self.policy.name());
            if let Err(e) = self.actuator.manual_stop() {
                warn!("Stopping the base failed: {}", e);
            }
        }
        self.phase = DrivePhase::Idle;
        self.target = None;
    }

    fn name(&self) -> &'static str {
        self.policy.name()
    }
}
