// core/geometry.rs

// Value types shared by the drive strategies and the collaborator interfaces:
// planar poses, navigation goals tagged with their reference frame, timestamped
// robot poses and global plans. Units are meters and radians throughout.

use serde::{Deserialize, Serialize};

/// Planar pose (x, y, yaw)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position (meters)
    pub x: f64,
    /// Y position (meters)
    pub y: f64,
    /// Orientation (radians)
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Pose2D { x, y, yaw }
    }
}

/// Reference frame a goal is expressed in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frame {
    /// Map frame
    Global,
    /// Relative to the robot base at the time the goal is consumed
    Local,
}

/// Target pose for one drive attempt
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavigationGoal {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub frame: Frame,
    /// Distance below which the navigation server may consider the goal reached
    #[serde(default)]
    pub tolerance: f64,
}

impl NavigationGoal {
    /// Goal in map coordinates
    pub fn global(x: f64, y: f64, yaw: f64) -> Self {
        NavigationGoal {
            x,
            y,
            yaw,
            frame: Frame::Global,
            tolerance: 0.0,
        }
    }

    /// Goal relative to the robot base
    pub fn local(dx: f64, dy: f64, dyaw: f64) -> Self {
        NavigationGoal {
            x: dx,
            y: dy,
            yaw: dyaw,
            frame: Frame::Local,
            tolerance: 0.0,
        }
    }

    /// Rotate in place by `dyaw` radians
    pub fn rotation(dyaw: f64) -> Self {
        Self::local(0.0, 0.0, dyaw)
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn pose(&self) -> Pose2D {
        Pose2D::new(self.x, self.y, self.yaw)
    }
}

/// Timestamped robot pose as reported by the position sensor
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotPose {
    pub pose: Pose2D,
    /// Milliseconds since the UNIX epoch
    pub stamp_ms: u64,
}

impl RobotPose {
    pub fn new(x: f64, y: f64, yaw: f64, stamp_ms: u64) -> Self {
        RobotPose {
            pose: Pose2D::new(x, y, yaw),
            stamp_ms,
        }
    }

    pub fn yaw(&self) -> f64 {
        self.pose.yaw
    }
}

/// Ordered waypoints from the robot towards a goal, in map coordinates
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalPlan {
    pub poses: Vec<Pose2D>,
}

impl GlobalPlan {
    pub fn new(poses: Vec<Pose2D>) -> Self {
        GlobalPlan { poses }
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Pose2D> {
        self.poses.get(index)
    }

    /// Straight-line plan with roughly `spacing` meters between waypoints.
    /// The last waypoint is always `to`; `from` itself is not included.
    pub fn straight_line(from: Pose2D, to: Pose2D, spacing: f64) -> Self {
        let length = ((to.x - from.x).powi(2) + (to.y - from.y).powi(2)).sqrt();
        let steps = if spacing > 0.0 {
            (length / spacing).ceil().max(1.0) as usize
        } else {
            1
        };
        let heading = (to.y - from.y).atan2(to.x - from.x);

        let poses = (1..=steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                Pose2D::new(
                    from.x + (to.x - from.x) * t,
                    from.y + (to.y - from.y) * t,
                    heading,
                )
            })
            .collect();

        GlobalPlan { poses }
    }
}
