// core/state.rs

// States reported by a drive strategy to its owner, and the internal phases a
// strategy steps through between `init()` and a terminal state.

use std::fmt;

use crate::interface::CommandHandle;
use crate::interface::NavResult;

/// Result of one `execute()` cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyState {
    Success,
    Error,
    NotFinished,
    PathBlocked,
    /// The robot drove but stopped short of the goal
    ReachedPartly,
    ReachedArea,
    NotMoved,
}

impl StrategyState {
    /// Whether the owner should stop polling
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StrategyState::NotFinished)
    }
}

impl fmt::Display for StrategyState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            StrategyState::Success => "SUCCESS",
            StrategyState::Error => "ERROR",
            StrategyState::NotFinished => "NOT_FINISHED",
            StrategyState::PathBlocked => "PATH_BLOCKED",
            StrategyState::ReachedPartly => "REACHED_PARTLY",
            StrategyState::ReachedArea => "REACHED_AREA",
            StrategyState::NotMoved => "NOT_MOVED",
        };
        write!(f, "{}", name)
    }
}

/// Internal phase of one drive attempt.
///
/// Command handles live inside the phase, so at most one command can be
/// outstanding at any time.
#[derive(Debug)]
pub enum DrivePhase {
    /// No drive attempt initialised
    Idle,
    /// No command outstanding; the next cycle plans
    AwaitingPlan,
    /// Drive command towards an intermediate goal is outstanding
    Driving(CommandHandle<NavResult>),
    /// In-place rotation towards the target yaw is outstanding
    CorrectingYaw(CommandHandle<NavResult>),
    /// Terminal; holds the state reported on every further cycle
    Finished(StrategyState),
}

impl DrivePhase {
    pub fn has_pending_command(&self) -> bool {
        matches!(self, DrivePhase::Driving(_) | DrivePhase::CorrectingYaw(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            DrivePhase::Idle => "Idle",
            DrivePhase::AwaitingPlan => "AwaitingPlan",
            DrivePhase::Driving(_) => "Driving",
            DrivePhase::CorrectingYaw(_) => "CorrectingYaw",
            DrivePhase::Finished(_) => "Finished",
        }
    }
}
