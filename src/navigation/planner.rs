// src/navigation/planner.rs
// Plans the next intermediate goal by walking back along the global plan.

use log::{debug, warn};

use super::controller::{GoalPolicy, PlanContext};
use crate::core::{Frame, GlobalPlan, NavigationGoal};
use crate::error::{DriveError, DriveResult};
use crate::interface::{ActuatorError, CommandStatus};

/// Picks the plan waypoint `take_goal` steps back from the end.
///
/// The first attempt aims at the last waypoint; every further attempt aims one
/// waypoint closer to the robot. Once `take_goal` reaches the replan ceiling no
/// more goals are produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestToTarget;

/// Index of the waypoint to drive to: `max(plan_len - take_goal, 0)`, clamped
/// into the plan
pub fn waypoint_index(plan_len: usize, take_goal: u32) -> usize {
    plan_len
        .saturating_sub(take_goal as usize)
        .min(plan_len.saturating_sub(1))
}

impl NearestToTarget {
    /// One plan request. Asynchronous planning is preferred; collaborators
    /// without it are asked synchronously.
    fn plan_once(ctx: &PlanContext) -> DriveResult<GlobalPlan> {
        match ctx.actuator.get_plan(ctx.target, ctx.robot) {
            Ok(mut handle) => {
                let timeout = ctx.config.plan_timeout();
                match handle.wait(timeout, ctx.config.plan_poll()) {
                    CommandStatus::Ready(plan) => Ok(plan),
                    CommandStatus::Pending => Err(DriveError::PlanTimeout(timeout)),
                    CommandStatus::Abandoned => Err(DriveError::CommandAbandoned),
                }
            }
            Err(ActuatorError::Unsupported) => {
                debug!("Asynchronous planning unsupported, using try_goal");
                Ok(ctx.actuator.try_goal(ctx.target)?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Requests a plan, retrying a failed request once
    fn request_plan(ctx: &PlanContext) -> DriveResult<GlobalPlan> {
        Self::plan_once(ctx).or_else(|e| {
            warn!("Plan request failed ({}), retrying once", e);
            Self::plan_once(ctx)
        })
    }
}

impl GoalPolicy for NearestToTarget {
    fn name(&self) -> &'static str {
        "NearestToTarget"
    }

    fn find_best_goal(&mut self, ctx: &PlanContext) -> DriveResult<Option<NavigationGoal>> {
        if ctx.take_goal >= ctx.config.replan {
            debug!(
                "Replan ceiling reached ({} of {})",
                ctx.take_goal, ctx.config.replan
            );
            return Ok(None);
        }

        let plan = Self::request_plan(ctx)?;
        if plan.is_empty() {
            debug!("Planner returned an empty plan");
            return Ok(None);
        }

        let index = waypoint_index(plan.len(), ctx.take_goal);
        let Some(waypoint) = plan.get(index) else {
            return Ok(None);
        };
        debug!("Selected waypoint {} of {}", index, plan.len());

        Ok(Some(NavigationGoal {
            x: waypoint.x,
            y: waypoint.y,
            yaw: ctx.target.yaw,
            frame: Frame::Global,
            tolerance: ctx.target.tolerance,
        }))
    }
}
