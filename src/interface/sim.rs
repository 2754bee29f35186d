// src/interface/sim.rs
// In-process mobile base implementing both collaborator capabilities.
// Used by the demo binary and the integration tests in place of a real
// navigation stack.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, info};
use parking_lot::Mutex;

use super::actuator::{ActuatorError, NavResult, NavigationActuator};
use super::command::CommandHandle;
use super::sensor::PositionSensor;
use crate::core::{GlobalPlan, NavigationGoal, Pose2D, RobotPose, normalize_angle, to_global, yaw_difference};

/// Which actuator operation produced a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    Coordinate,
    Relative,
    Interrupt,
}

/// Command as received by the simulated base
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IssuedCommand {
    pub kind: CommandKind,
    pub goal: NavigationGoal,
}

/// Behaviour knobs of the simulated base
#[derive(Clone, Debug)]
pub struct SimSettings {
    /// Time until a drive command resolves; zero resolves inline
    pub latency: Duration,
    /// Fraction of the way to the goal covered by a successful command
    pub reach_ratio: f64,
    /// Waypoint spacing of generated plans (meters)
    pub plan_spacing: f64,
    /// Whether `get_plan` is offered
    pub async_planning: bool,
    /// Whether `try_goal` is offered
    pub sync_planning: bool,
}

impl Default for SimSettings {
    fn default() -> Self {
        SimSettings {
            latency: Duration::ZERO,
            reach_ratio: 1.0,
            plan_spacing: 0.25,
            async_planning: true,
            sync_planning: true,
        }
    }
}

#[derive(Debug)]
struct SimState {
    pose: Pose2D,
    pose_available: bool,
    scripted: VecDeque<NavResult>,
    commands: Vec<IssuedCommand>,
    stops: usize,
    costmap_clears: usize,
    plan_requests: usize,
    generation: u64,
}

/// Simulated differential base with an ideal localization
#[derive(Clone)]
pub struct SimulatedBase {
    state: Arc<Mutex<SimState>>,
    settings: SimSettings,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl SimulatedBase {
    pub fn new(start: Pose2D) -> Self {
        Self::with_settings(start, SimSettings::default())
    }

    pub fn with_settings(start: Pose2D, settings: SimSettings) -> Self {
        SimulatedBase {
            state: Arc::new(Mutex::new(SimState {
                pose: start,
                pose_available: true,
                scripted: VecDeque::new(),
                commands: Vec::new(),
                stops: 0,
                costmap_clears: 0,
                plan_requests: 0,
                generation: 0,
            })),
            settings,
        }
    }

    /// Queues outcomes for the next drive commands; unscripted commands succeed
    pub fn script_results<I: IntoIterator<Item = NavResult>>(&self, results: I) {
        self.state.lock().scripted.extend(results);
    }

    pub fn set_pose(&self, pose: Pose2D) {
        self.state.lock().pose = pose;
    }

    pub fn pose(&self) -> Pose2D {
        self.state.lock().pose
    }

    /// Simulates a localization dropout
    pub fn set_pose_available(&self, available: bool) {
        self.state.lock().pose_available = available;
    }

    pub fn commands(&self) -> Vec<IssuedCommand> {
        self.state.lock().commands.clone()
    }

    pub fn stop_count(&self) -> usize {
        self.state.lock().stops
    }

    pub fn costmap_clears(&self) -> usize {
        self.state.lock().costmap_clears
    }

    pub fn plan_requests(&self) -> usize {
        self.state.lock().plan_requests
    }

    fn dispatch(&self, kind: CommandKind, goal: &NavigationGoal) -> CommandHandle<NavResult> {
        let (result, target, generation) = {
            let mut state = self.state.lock();
            state.commands.push(IssuedCommand { kind, goal: *goal });
            if kind == CommandKind::Interrupt {
                state.generation += 1;
            }
            let robot = RobotPose {
                pose: state.pose,
                stamp_ms: now_ms(),
            };
            let result = state.scripted.pop_front().unwrap_or(NavResult::Success);
            (result, to_global(goal, &robot).pose(), state.generation)
        };
        debug!("Simulated base received {:?} command to {:?} -> {:?}", kind, target, result);

        if self.settings.latency.is_zero() {
            apply_motion(&self.state, target, result, self.settings.reach_ratio);
            return CommandHandle::resolved(result);
        }

        let (completer, handle) = CommandHandle::pending();
        let state = Arc::clone(&self.state);
        let latency = self.settings.latency;
        let reach_ratio = self.settings.reach_ratio;
        thread::spawn(move || {
            thread::sleep(latency);
            if state.lock().generation != generation {
                completer.complete(NavResult::Cancelled);
                return;
            }
            apply_motion(&state, target, result, reach_ratio);
            completer.complete(result);
        });
        handle
    }
}

fn apply_motion(state: &Mutex<SimState>, target: Pose2D, result: NavResult, reach_ratio: f64) {
    let ratio = match result {
        NavResult::Success => reach_ratio,
        NavResult::PathBlocked => reach_ratio * 0.5,
        _ => 0.0,
    };
    let mut state = state.lock();
    let pose = state.pose;
    state.pose = Pose2D::new(
        pose.x + (target.x - pose.x) * ratio,
        pose.y + (target.y - pose.y) * ratio,
        normalize_angle(pose.yaw + yaw_difference(target.yaw, pose.yaw) * ratio),
    );
}

impl PositionSensor for SimulatedBase {
    fn read_last(&self, _timeout: Duration) -> Option<RobotPose> {
        let state = self.state.lock();
        state.pose_available.then(|| RobotPose {
            pose: state.pose,
            stamp_ms: now_ms(),
        })
    }
}

impl NavigationActuator for SimulatedBase {
    fn navigate_to_coordinate(&self, goal: &NavigationGoal) -> CommandHandle<NavResult> {
        self.dispatch(CommandKind::Coordinate, goal)
    }

    fn navigate_relative(&self, goal: &NavigationGoal) -> CommandHandle<NavResult> {
        self.dispatch(CommandKind::Relative, goal)
    }

    fn navigate_to_interrupt(&self, goal: &NavigationGoal) -> CommandHandle<NavResult> {
        self.dispatch(CommandKind::Interrupt, goal)
    }

    fn get_plan(
        &self,
        goal: &NavigationGoal,
        from: &RobotPose,
    ) -> Result<CommandHandle<GlobalPlan>, ActuatorError> {
        if !self.settings.async_planning {
            return Err(ActuatorError::Unsupported);
        }
        self.state.lock().plan_requests += 1;
        Ok(CommandHandle::resolved(GlobalPlan::straight_line(
            from.pose,
            goal.pose(),
            self.settings.plan_spacing,
        )))
    }

    fn try_goal(&self, goal: &NavigationGoal) -> Result<GlobalPlan, ActuatorError> {
        if !self.settings.sync_planning {
            return Err(ActuatorError::Unsupported);
        }
        let mut state = self.state.lock();
        state.plan_requests += 1;
        Ok(GlobalPlan::straight_line(state.pose, goal.pose(), self.settings.plan_spacing))
    }

    fn manual_stop(&self) -> Result<(), ActuatorError> {
        let mut state = self.state.lock();
        state.stops += 1;
        state.generation += 1;
        info!("Simulated base stopped");
        Ok(())
    }

    fn clear_costmap(&self) -> Result<(), ActuatorError> {
        self.state.lock().costmap_clears += 1;
        Ok(())
    }
}
