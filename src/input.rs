use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks keyboard state: keys held, and keys pressed or released this frame.
#[derive(Debug, Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the end of each frame to reset per-frame state.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.press(key),
                        ElementState::Released => self.release(key),
                    }
                }
            }
            // Releases that happen while unfocused never arrive.
            WindowEvent::Focused(false) => {
                let held: Vec<KeyCode> = self.keys_down.drain().collect();
                self.keys_released.extend(held);
            }
            _ => {}
        }
    }

    /// Records a key going down. Auto-repeat does not count as a new press.
    pub fn press(&mut self, key: KeyCode) {
        if self.keys_down.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    pub fn release(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
        self.keys_released.insert(key);
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the key was released this frame.
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    pub fn shift_down(&self) -> bool {
        self.key_down(KeyCode::ShiftLeft) || self.key_down(KeyCode::ShiftRight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_reported_once_until_released() {
        let mut input = Input::new();
        input.press(KeyCode::KeyW);
        assert!(input.key_pressed(KeyCode::KeyW));
        input.end_frame();

        // auto-repeat
        input.press(KeyCode::KeyW);
        assert!(input.key_down(KeyCode::KeyW));
        assert!(!input.key_pressed(KeyCode::KeyW));

        input.release(KeyCode::KeyW);
        assert!(!input.key_down(KeyCode::KeyW));
        assert!(input.key_released(KeyCode::KeyW));
        input.end_frame();
        assert!(!input.key_released(KeyCode::KeyW));
    }

    #[test]
    fn losing_focus_releases_everything() {
        let mut input = Input::new();
        input.press(KeyCode::KeyA);
        input.press(KeyCode::ShiftRight);
        assert!(input.shift_down());
        input.handle_event(&WindowEvent::Focused(false));
        assert!(!input.key_down(KeyCode::KeyA));
        assert!(!input.shift_down());
        assert!(input.key_released(KeyCode::KeyA));
    }
}
