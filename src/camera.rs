//! First-person camera driven by held keys.
//!
//! Orientation is kept as spherical angles in degrees: `yaw` turns about +Y with 0
//! facing +Z, and `pitch` is measured down from straight up, so 90 is level.
//! Movement happens in fixed steps per frame, not per second.
//!
//! | Keys        | Effect                                  |
//! |-------------|-----------------------------------------|
//! | W / S       | step forward / back along the heading   |
//! | A / D       | strafe left / right                     |
//! | Q / E       | rise / sink                             |
//! | Arrow keys  | look around                             |

use glam::{Mat4, Vec3};
use winit::keyboard::KeyCode;

use crate::input::Input;
use crate::layout::{FLOOR_CEILING_MARGIN, HEIGHT, LENGTH, WALL_MARGIN, WIDTH};

/// Vertical field of view, in degrees.
pub const FOV_Y_DEGREES: f32 = 60.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 20.0;

const MIN_PITCH: f32 = 0.1;
const MAX_PITCH: f32 = 179.9;

/// Where the viewer is and which way they look.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    /// Degrees about +Y; 0 looks along +Z, 90 along +X.
    pub yaw: f32,
    /// Degrees from straight up; 90 is level.
    pub pitch: f32,
}

impl Default for CameraState {
    /// Standing at the back of the room, facing the whiteboards.
    fn default() -> Self {
        Self {
            position: Vec3::new(8.0 * 0.3, 1.5, 0.1),
            yaw: 0.0,
            pitch: 90.0,
        }
    }
}

impl CameraState {
    /// Unit look direction.
    pub fn forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        Vec3::new(sin_yaw * sin_pitch, cos_pitch, cos_yaw * sin_pitch)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect, NEAR, FAR)
    }

    /// Keeps the camera inside the room.
    pub fn clamp_to_room(&mut self) {
        let p = &mut self.position;
        p.x = p.x.clamp(WALL_MARGIN, WIDTH - WALL_MARGIN);
        p.z = p.z.clamp(WALL_MARGIN, LENGTH - WALL_MARGIN);
        p.y = p.y.clamp(FLOOR_CEILING_MARGIN, HEIGHT - FLOOR_CEILING_MARGIN);
    }
}

/// Applies held keys to a [`CameraState`] once per frame.
#[derive(Clone, Debug)]
pub struct CameraController {
    /// Meters moved per frame while a movement key is held.
    pub step: f32,
    /// Degrees turned per frame while an arrow key is held.
    pub angle_step: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            step: 0.2,
            angle_step: 5.0,
        }
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    pub fn angle_step(mut self, degrees: f32) -> Self {
        self.angle_step = degrees;
        self
    }

    /// Updates the camera for one frame. With `lock` on, the result is clamped to
    /// the room.
    pub fn update(&self, camera: &mut CameraState, input: &Input, lock: bool) {
        if input.key_down(KeyCode::ArrowDown) {
            camera.pitch = (camera.pitch + self.angle_step).min(MAX_PITCH);
        }
        if input.key_down(KeyCode::ArrowUp) {
            camera.pitch = (camera.pitch - self.angle_step).max(MIN_PITCH);
        }
        if input.key_down(KeyCode::ArrowRight) {
            camera.yaw = (camera.yaw - self.angle_step) % 360.0;
        }
        if input.key_down(KeyCode::ArrowLeft) {
            camera.yaw = (camera.yaw + self.angle_step) % 360.0;
        }

        let (sin, cos) = camera.yaw.to_radians().sin_cos();
        let heading = Vec3::new(sin, 0.0, cos);
        // +X is on the viewer's left when yaw is 0.
        let left = Vec3::new(cos, 0.0, -sin);

        let mut motion = Vec3::ZERO;
        if input.key_down(KeyCode::KeyW) {
            motion += heading;
        }
        if input.key_down(KeyCode::KeyS) {
            motion -= heading;
        }
        if input.key_down(KeyCode::KeyA) {
            motion += left;
        }
        if input.key_down(KeyCode::KeyD) {
            motion -= left;
        }
        if input.key_down(KeyCode::KeyQ) {
            motion += Vec3::Y;
        }
        if input.key_down(KeyCode::KeyE) {
            motion -= Vec3::Y;
        }
        camera.position += motion * self.step;

        if lock {
            camera.clamp_to_room();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn holding(keys: &[KeyCode]) -> Input {
        let mut input = Input::new();
        for &key in keys {
            input.press(key);
        }
        input
    }

    #[test]
    fn five_forward_steps_advance_one_meter() {
        let controller = CameraController::new();
        let mut camera = CameraState::default();
        let input = holding(&[KeyCode::KeyW]);
        for _ in 0..5 {
            controller.update(&mut camera, &input, true);
        }
        assert_relative_eq!(camera.position.z, 1.1, epsilon = 1e-5);
        assert_relative_eq!(camera.position.x, 2.4, epsilon = 1e-5);
    }

    #[test]
    fn level_camera_looks_along_z() {
        let forward = CameraState::default().forward();
        assert_relative_eq!(forward.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(forward.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(forward.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn strafe_left_moves_toward_positive_x() {
        let controller = CameraController::new();
        let mut camera = CameraState::default();
        controller.update(&mut camera, &holding(&[KeyCode::KeyA]), false);
        assert_relative_eq!(camera.position.x, 2.6, epsilon = 1e-5);
        controller.update(&mut camera, &holding(&[KeyCode::KeyD]), false);
        controller.update(&mut camera, &holding(&[KeyCode::KeyD]), false);
        assert_relative_eq!(camera.position.x, 2.2, epsilon = 1e-5);
    }

    #[test]
    fn pitch_stops_short_of_the_poles() {
        let controller = CameraController::new();
        let mut camera = CameraState::default();
        let up = holding(&[KeyCode::ArrowUp]);
        for _ in 0..40 {
            controller.update(&mut camera, &up, true);
        }
        assert_relative_eq!(camera.pitch, MIN_PITCH);
        let down = holding(&[KeyCode::ArrowDown]);
        for _ in 0..40 {
            controller.update(&mut camera, &down, true);
        }
        assert_relative_eq!(camera.pitch, MAX_PITCH);
    }

    #[test]
    fn yaw_wraps_after_a_full_turn() {
        let controller = CameraController::new();
        let mut camera = CameraState::default();
        let left = holding(&[KeyCode::ArrowLeft]);
        for _ in 0..73 {
            controller.update(&mut camera, &left, true);
        }
        assert_relative_eq!(camera.yaw, 5.0, epsilon = 1e-3);
    }

    #[test]
    fn lock_keeps_camera_inside_the_room() {
        let controller = CameraController::new();
        let mut camera = CameraState::default();
        let input = holding(&[KeyCode::KeyS, KeyCode::KeyE]);
        for _ in 0..20 {
            controller.update(&mut camera, &input, true);
        }
        assert_relative_eq!(camera.position.z, WALL_MARGIN);
        assert_relative_eq!(camera.position.y, FLOOR_CEILING_MARGIN);

        controller.update(&mut camera, &input, false);
        assert!(camera.position.z < WALL_MARGIN);
    }
}
