// core/localization.rs

// Frame helpers for the drive strategies: converts robot-relative goals into map
// coordinates using a pose snapshot, and provides the distance / yaw error
// measures used by the success checks.

use log::debug;
use nalgebra::{Isometry2, UnitComplex, Vector2};

use super::geometry::{Frame, NavigationGoal, Pose2D, RobotPose};

/// Wraps an angle into (-pi, pi]
pub fn normalize_angle(angle: f64) -> f64 {
    UnitComplex::new(angle).angle()
}

/// Signed rotation that takes `current` onto `target`, normalized
pub fn yaw_difference(target: f64, current: f64) -> f64 {
    normalize_angle(target - current)
}

/// Euclidean distance in the plane
pub fn distance(a: &Pose2D, b: &Pose2D) -> f64 {
    (Vector2::new(b.x, b.y) - Vector2::new(a.x, a.y)).norm()
}

fn isometry(pose: &Pose2D) -> Isometry2<f64> {
    Isometry2::new(Vector2::new(pose.x, pose.y), pose.yaw)
}

/// Expresses `goal` in the map frame.
///
/// GLOBAL goals are returned untouched. LOCAL goals are composed with the robot
/// pose: the offset is rotated by the robot yaw and the yaw offset is added.
pub fn to_global(goal: &NavigationGoal, robot: &RobotPose) -> NavigationGoal {
    match goal.frame {
        Frame::Global => *goal,
        Frame::Local => {
            let composed = isometry(&robot.pose) * isometry(&goal.pose());
            let converted = NavigationGoal {
                x: composed.translation.vector.x,
                y: composed.translation.vector.y,
                yaw: composed.rotation.angle(),
                frame: Frame::Global,
                tolerance: goal.tolerance,
            };
            debug!(
                "Converted local goal ({:.3}, {:.3}, {:.3}) to global ({:.3}, {:.3}, {:.3})",
                goal.x, goal.y, goal.yaw, converted.x, converted.y, converted.yaw
            );
            converted
        }
    }
}
