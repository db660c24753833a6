//! Works out which chair, if any, the camera is aimed at.
//!
//! A chair qualifies when its floor point is within [`REACH`] of the camera (on the
//! floor plane) and the angle between the camera's heading and the direction to
//! the chair is under the current threshold. The threshold starts at
//! [`MAX_ANGLE_DEGREES`] and shrinks to each accepted angle, so the chair closest
//! to the line of sight wins. Equal angles keep the earlier chair.

use crate::layout::ChairId;
use glam::{Vec2, Vec3};

/// Maximum floor distance to a targetable chair, in meters.
pub const REACH: f32 = 1.5;
/// Widest accepted angle off the camera heading.
pub const MAX_ANGLE_DEGREES: f32 = 15.0;

#[derive(Clone, Debug)]
pub struct InteractionDetector {
    camera: Vec2,
    forward: Vec2,
    threshold: f32,
    selected: Option<ChairId>,
}

impl InteractionDetector {
    /// Starts a fresh search from the camera's position and yaw (degrees).
    pub fn new(camera_position: Vec3, yaw_degrees: f32) -> Self {
        let (sin, cos) = yaw_degrees.to_radians().sin_cos();
        Self {
            camera: Vec2::new(camera_position.x, camera_position.z),
            forward: Vec2::new(sin, cos),
            threshold: MAX_ANGLE_DEGREES.to_radians(),
            selected: None,
        }
    }

    /// Tests one chair, given the world position of its floor point.
    pub fn consider(&mut self, chair: ChairId, world_position: Vec3) {
        let delta = Vec2::new(world_position.x, world_position.z) - self.camera;
        let distance = delta.length();
        if distance >= REACH || distance == 0.0 {
            return;
        }
        let angle = (self.forward.dot(delta) / distance).clamp(-1.0, 1.0).acos();
        if angle < self.threshold {
            self.threshold = angle;
            self.selected = Some(chair);
        }
    }

    pub fn targeted(&self) -> Option<ChairId> {
        self.selected
    }

    pub fn in_range(&self) -> bool {
        self.selected.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chair(i: usize) -> ChairId {
        ChairId::new(i).unwrap()
    }

    #[test]
    fn selects_chair_straight_ahead() {
        let mut detector = InteractionDetector::new(Vec3::new(1.0, 1.5, 1.0), 0.0);
        detector.consider(chair(0), Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(detector.targeted(), Some(chair(0)));
        assert!(detector.in_range());
    }

    #[test]
    fn facing_away_selects_nothing() {
        let mut detector = InteractionDetector::new(Vec3::new(1.0, 1.5, 1.0), 180.0);
        detector.consider(chair(0), Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(detector.targeted(), None);
        assert!(!detector.in_range());
    }

    #[test]
    fn out_of_reach_is_ignored() {
        let mut detector = InteractionDetector::new(Vec3::ZERO, 0.0);
        detector.consider(chair(0), Vec3::new(0.0, 0.0, 1.6));
        assert_eq!(detector.targeted(), None);
    }

    #[test]
    fn wide_angle_is_ignored() {
        let mut detector = InteractionDetector::new(Vec3::ZERO, 0.0);
        // 20° off the heading
        let (sin, cos) = 20f32.to_radians().sin_cos();
        detector.consider(chair(0), Vec3::new(sin, 0.0, cos));
        assert_eq!(detector.targeted(), None);
    }

    #[test]
    fn closest_to_line_of_sight_wins() {
        let mut detector = InteractionDetector::new(Vec3::ZERO, 90.0);
        // yaw 90 faces +x
        detector.consider(chair(0), Vec3::new(1.0, 0.0, 0.2));
        detector.consider(chair(1), Vec3::new(1.0, 0.0, 0.05));
        detector.consider(chair(2), Vec3::new(1.0, 0.0, -0.1));
        assert_eq!(detector.targeted(), Some(chair(1)));
    }

    #[test]
    fn ties_keep_the_first_chair() {
        let mut detector = InteractionDetector::new(Vec3::ZERO, 0.0);
        detector.consider(chair(5), Vec3::new(0.0, 0.0, 1.0));
        detector.consider(chair(6), Vec3::new(0.0, 0.0, 1.2));
        assert_eq!(detector.targeted(), Some(chair(5)));
    }
}
