//! One running classroom: everything a frame needs except the GPU.
//!
//! [`Session::tick`] advances the scene by one frame in a fixed order:
//! toggles, camera, fixture controls, door proximity, animations, then exactly one
//! traversal of the scene tree.
//!
//! | Keys            | Effect                                       |
//! |-----------------|----------------------------------------------|
//! | 1 / 2 / 3       | toggle back / centre / front ceiling light   |
//! | 4 / 5 / 6       | slide left / centre / right boards (Shift reverses) |
//! | 7 / 8 / 9       | lower back / centre / front blind (Shift raises) |
//! | P / O           | raise / lower the sun                        |
//! | 0               | toggle textures                              |
//! | Enter           | toggle the instruction panel                 |
//! | C               | toggle the camera lock                       |
//! | Space           | tuck or pull out the targeted chair          |

use std::time::Instant;

use winit::keyboard::KeyCode;

use crate::camera::{CameraController, CameraState};
use crate::input::Input;
use crate::scene::classroom;
use crate::scene::composer::{Composer, DrawQueue, Traversal};
use crate::scene::graph::Node;
use crate::scene::state::SceneState;

const LIGHT_KEYS: [KeyCode; 3] = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3];
const BOARD_KEYS: [KeyCode; 3] = [KeyCode::Digit4, KeyCode::Digit5, KeyCode::Digit6];
const BLIND_KEYS: [KeyCode; 3] = [KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9];

/// Board and blind travel per millisecond a key is held.
const FIXTURE_RATE_PER_MS: f32 = 0.0005;
/// Sun height change per frame.
const SUN_STEP: f32 = 0.2;

pub struct Session {
    pub state: SceneState,
    pub camera: CameraState,
    controller: CameraController,
    tree: Node,
    composer: Composer,
    draws: DrawQueue,
    traversal: Traversal,
}

impl Session {
    pub fn new(camera_lock: bool) -> Self {
        let tree = classroom::build();
        log::debug!("classroom tree built: {} draws per frame", tree.draw_count());
        Self {
            state: SceneState::new(camera_lock),
            camera: CameraState::default(),
            controller: CameraController::default(),
            tree,
            composer: Composer::new(),
            draws: DrawQueue::new(),
            traversal: Traversal::default(),
        }
    }

    /// This frame's draws, valid after [`tick`](Self::tick).
    pub fn draws(&self) -> &DrawQueue {
        &self.draws
    }

    pub fn traversal(&self) -> Traversal {
        self.traversal
    }

    /// Advances one frame. `frame_ms` is the time since the previous frame.
    pub fn tick(&mut self, input: &Input, now: Instant, frame_ms: f32) -> Traversal {
        self.apply_toggles(input, now);
        self.controller
            .update(&mut self.camera, input, self.state.camera_lock);
        self.apply_fixture_controls(input, frame_ms);

        let position = self.camera.position;
        self.state.door.update_proximity(position.x, position.z, now);
        self.state.tick_animations(now);

        self.draws.clear();
        let traversal = self
            .composer
            .compose(&self.tree, &self.state, &self.camera, &mut self.draws);
        if traversal.targeted != self.traversal.targeted {
            match traversal.targeted {
                Some(chair) => log::debug!("targeting {chair}"),
                None => log::debug!("no chair targeted"),
            }
        }
        self.traversal = traversal;
        traversal
    }

    /// Keys that act once per press.
    fn apply_toggles(&mut self, input: &Input, now: Instant) {
        if input.key_pressed(KeyCode::Digit0) {
            self.state.toggle_textures();
        }
        if input.key_pressed(KeyCode::Enter) || input.key_pressed(KeyCode::NumpadEnter) {
            self.state.toggle_instructions();
        }
        if input.key_pressed(KeyCode::KeyC) {
            self.state.toggle_camera_lock();
        }
        for (index, key) in LIGHT_KEYS.into_iter().enumerate() {
            if input.key_pressed(key) {
                self.state.lighting.toggle_ceiling(index);
            }
        }
        // The prompt the user reacted to came from the previous frame's traversal.
        if input.key_pressed(KeyCode::Space) {
            if let Some(chair) = self.traversal.targeted {
                self.state.chairs.toggle(chair, now);
            }
        }
    }

    /// Keys that act for as long as they are held.
    fn apply_fixture_controls(&mut self, input: &Input, frame_ms: f32) {
        let travel = frame_ms * FIXTURE_RATE_PER_MS;
        let shift = input.shift_down();

        for (board, key) in BOARD_KEYS.into_iter().enumerate() {
            if input.key_down(key) {
                self.state
                    .slide_board(board, if shift { -travel } else { travel });
            }
        }
        for (blind, key) in BLIND_KEYS.into_iter().enumerate() {
            if input.key_down(key) {
                self.state
                    .lighting
                    .adjust_blind(blind, if shift { travel } else { -travel });
            }
        }
        if input.key_down(KeyCode::KeyP) {
            self.state.lighting.raise_sun(SUN_STEP);
        }
        if input.key_down(KeyCode::KeyO) {
            self.state.lighting.raise_sun(-SUN_STEP);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::CHAIR_TRAVEL;
    use crate::layout::{self, ChairId};
    use crate::lighting::BLIND_MAX;
    use approx::assert_relative_eq;
    use glam::Vec3;
    use std::time::Duration;

    fn press_once(session: &mut Session, key: KeyCode, now: Instant) -> Traversal {
        let mut input = Input::new();
        input.press(key);
        let traversal = session.tick(&input, now, 16.0);
        input.release(key);
        input.end_frame();
        traversal
    }

    #[test]
    fn five_forward_steps_advance_one_meter() {
        let mut session = Session::new(true);
        let mut input = Input::new();
        input.press(KeyCode::KeyW);
        let now = Instant::now();
        for _ in 0..5 {
            session.tick(&input, now, 16.0);
            input.end_frame();
        }
        assert_relative_eq!(session.camera.position.z, 1.1, epsilon = 1e-5);
        assert_relative_eq!(session.camera.position.x, 2.4, epsilon = 1e-5);
    }

    #[test]
    fn every_frame_composes_the_whole_room() {
        let mut session = Session::new(true);
        session.tick(&Input::new(), Instant::now(), 16.0);
        assert_eq!(session.draws().len(), classroom::build().draw_count());
    }

    #[test]
    fn space_moves_the_chair_targeted_last_frame() {
        let mut session = Session::new(true);
        session.camera.position = Vec3::new(0.31, 1.5, 0.3);
        let t0 = Instant::now();

        let first = ChairId::new(0).unwrap();
        assert_eq!(session.tick(&Input::new(), t0, 16.0).targeted, Some(first));

        press_once(&mut session, KeyCode::Space, t0);
        assert!(session.state.chairs.any_animating());

        session.tick(&Input::new(), t0 + Duration::from_secs(2), 16.0);
        assert_relative_eq!(session.state.chair_offset(first), -CHAIR_TRAVEL);
        assert!(!session.state.chairs.any_animating());
    }

    #[test]
    fn space_without_a_target_does_nothing() {
        let mut session = Session::new(true);
        press_once(&mut session, KeyCode::Space, Instant::now());
        assert!(!session.state.chairs.any_animating());
    }

    #[test]
    fn walking_up_to_the_door_opens_it() {
        let mut session = Session::new(true);
        let (door_x, door_z) = layout::door_trigger_point();
        session.camera.position = Vec3::new(door_x, 1.5, door_z);
        let t0 = Instant::now();

        session.tick(&Input::new(), t0, 16.0);
        assert!(session.state.door.in_range());
        session.tick(&Input::new(), t0 + Duration::from_millis(1100), 16.0);
        assert_relative_eq!(session.state.door_angle(), 100.0);
        assert!(!session.state.door.is_animating());
    }

    #[test]
    fn number_keys_drive_lights_and_blinds() {
        let mut session = Session::new(true);
        let now = Instant::now();
        press_once(&mut session, KeyCode::Digit3, now);
        assert!(!session.state.lighting.ceiling[2].is_on());
        assert!(session.state.lighting.ceiling[0].is_on());

        let mut input = Input::new();
        input.press(KeyCode::Digit8);
        session.tick(&input, now, 100.0);
        assert_relative_eq!(
            session.state.lighting.blind_bottom(1),
            BLIND_MAX - 0.05,
            epsilon = 1e-5
        );

        input.press(KeyCode::ShiftLeft);
        session.tick(&input, now, 1000.0);
        assert_eq!(session.state.lighting.blind_bottom(1), BLIND_MAX);
    }

    #[test]
    fn board_keys_slide_and_shift_reverses() {
        let mut session = Session::new(true);
        let mut input = Input::new();
        input.press(KeyCode::Digit4);
        session.tick(&input, Instant::now(), 200.0);
        assert_relative_eq!(session.state.board_offset(0), 0.1, epsilon = 1e-5);
        input.press(KeyCode::ShiftRight);
        session.tick(&input, Instant::now(), 100.0);
        assert_relative_eq!(session.state.board_offset(0), 0.05, epsilon = 1e-5);
        assert_eq!(session.state.board_offset(1), 0.0);
    }

    #[test]
    fn sun_keys_move_the_sun() {
        let mut session = Session::new(true);
        let start = session.state.lighting.sun.position.y;
        let mut input = Input::new();
        input.press(KeyCode::KeyP);
        session.tick(&input, Instant::now(), 16.0);
        session.tick(&input, Instant::now(), 16.0);
        assert_relative_eq!(session.state.lighting.sun.position.y, start + 0.4, epsilon = 1e-5);
    }

    #[test]
    fn toggles_fire_once_per_press() {
        let mut session = Session::new(true);
        let mut input = Input::new();
        input.press(KeyCode::Enter);
        input.press(KeyCode::Digit0);
        input.press(KeyCode::KeyC);
        session.tick(&input, Instant::now(), 16.0);
        input.end_frame();
        // still held, but no longer a fresh press
        session.tick(&input, Instant::now(), 16.0);
        assert!(!session.state.instructions_visible);
        assert!(!session.state.textures_enabled);
        assert!(!session.state.camera_lock);
    }
}
