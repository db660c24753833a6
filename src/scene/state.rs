//! Every mutable value the scene depends on, owned by the running session.

use std::time::Instant;

use crate::animation::{ChairAnimations, DoorController, TickOutcome};
use crate::layout::{ChairId, FIXTURE_COUNT};
use crate::lighting::Lighting;

/// Highest whiteboard slide offset, in feet of travel.
pub const BOARD_MAX: f32 = 2.75;

#[derive(Clone, Debug)]
pub struct SceneState {
    pub chairs: ChairAnimations,
    pub door: DoorController,
    pub lighting: Lighting,
    /// Slide offset of the left, centre and right whiteboard pairs.
    boards: [f32; FIXTURE_COUNT],
    pub textures_enabled: bool,
    pub instructions_visible: bool,
    pub camera_lock: bool,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            chairs: ChairAnimations::default(),
            door: DoorController::default(),
            lighting: Lighting::default(),
            boards: [0.0; FIXTURE_COUNT],
            textures_enabled: true,
            instructions_visible: true,
            camera_lock: true,
        }
    }
}

impl SceneState {
    pub fn new(camera_lock: bool) -> Self {
        Self {
            camera_lock,
            ..Self::default()
        }
    }

    pub fn chair_offset(&self, chair: ChairId) -> f32 {
        self.chairs.offset(chair)
    }

    pub fn door_angle(&self) -> f32 {
        self.door.angle()
    }

    pub fn board_offset(&self, board: usize) -> f32 {
        self.boards[board]
    }

    /// Slides a whiteboard pair, keeping it within its frame.
    pub fn slide_board(&mut self, board: usize, delta: f32) {
        if let Some(offset) = self.boards.get_mut(board) {
            *offset = (*offset + delta).clamp(0.0, BOARD_MAX);
        }
    }

    /// Advances every running animation; returns true while any is still moving.
    pub fn tick_animations(&mut self, now: Instant) -> bool {
        let chairs_moving = self.chairs.tick(now) > 0;
        let door_moving = self.door.tick(now) == TickOutcome::Reschedule;
        chairs_moving || door_moving
    }

    pub fn toggle_textures(&mut self) {
        self.textures_enabled = !self.textures_enabled;
        log::info!("textures {}", on_off(self.textures_enabled));
    }

    pub fn toggle_instructions(&mut self) {
        self.instructions_visible = !self.instructions_visible;
    }

    pub fn toggle_camera_lock(&mut self) {
        self.camera_lock = !self.camera_lock;
        log::info!("camera lock {}", on_off(self.camera_lock));
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn boards_stay_within_their_frame() {
        let mut state = SceneState::default();
        state.slide_board(0, -1.0);
        assert_eq!(state.board_offset(0), 0.0);
        state.slide_board(0, 1.5);
        assert_relative_eq!(state.board_offset(0), 1.5);
        state.slide_board(0, 10.0);
        assert_eq!(state.board_offset(0), BOARD_MAX);
        assert_eq!(state.board_offset(1), 0.0);
    }

    #[test]
    fn toggles_flip_flags() {
        let mut state = SceneState::new(false);
        assert!(!state.camera_lock);
        state.toggle_camera_lock();
        state.toggle_textures();
        state.toggle_instructions();
        assert!(state.camera_lock);
        assert!(!state.textures_enabled);
        assert!(!state.instructions_visible);
    }

    #[test]
    fn idle_scene_has_nothing_to_tick() {
        let mut state = SceneState::default();
        assert!(!state.tick_animations(Instant::now()));
    }
}
