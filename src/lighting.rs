//! Ceiling lights, the sun, and the window blinds that shade it.

use glam::Vec3;

use crate::color::Color;
use crate::layout::{FIXTURE_COUNT, LENGTH, WIDTH};

/// Warm white of a ceiling light that is switched on.
pub const CEILING_LIGHT: Color = Color::rgb8(255, 241, 224);
pub const SUN_LIGHT: Color = Color::rgb8(253, 184, 19);
/// Uniform grey ambient term.
pub const AMBIENT: f32 = 0.2;

/// Lowest and highest position of a blind's bottom edge.
pub const BLIND_MIN: f32 = 0.85;
pub const BLIND_MAX: f32 = 2.1;

/// Height of the light sources hanging from the ceiling.
const CEILING_LIGHT_Y: f32 = 2.65;
const SUN_START: Vec3 = Vec3::new(-5.0, 3.0, LENGTH / 2.0);

/// A point light that can be switched off without forgetting its color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    on_color: Color,
    on: bool,
}

impl PointLight {
    pub fn new(position: Vec3, on_color: Color) -> Self {
        Self {
            position,
            on_color,
            on: true,
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Emitted color: the stored color when on, black when off.
    pub fn color(&self) -> Color {
        if self.on { self.on_color } else { Color::BLACK }
    }

    pub fn toggle(&mut self) {
        self.on = !self.on;
    }
}

/// Names used in log messages, indexed like the lights and blinds.
pub const FIXTURE_NAMES: [&str; FIXTURE_COUNT] = ["back", "centre", "front"];

#[derive(Clone, Debug)]
pub struct Lighting {
    /// Back, centre and front ceiling lights.
    pub ceiling: [PointLight; FIXTURE_COUNT],
    pub sun: PointLight,
    /// Bottom edge height of the back, centre and front blinds.
    blinds: [f32; FIXTURE_COUNT],
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ceiling: std::array::from_fn(|i| {
                let z = (i + 1) as f32 * 14.0 * 0.15;
                PointLight::new(Vec3::new(WIDTH / 2.0 - 0.04, CEILING_LIGHT_Y, z), CEILING_LIGHT)
            }),
            sun: PointLight::new(SUN_START, SUN_LIGHT),
            blinds: [BLIND_MAX; FIXTURE_COUNT],
        }
    }
}

impl Lighting {
    pub fn toggle_ceiling(&mut self, index: usize) {
        let Some(light) = self.ceiling.get_mut(index) else {
            return;
        };
        light.toggle();
        log::info!(
            "{} light {}",
            FIXTURE_NAMES[index],
            if light.is_on() { "on" } else { "off" }
        );
    }

    /// Moves the sun up (positive) or down (negative).
    pub fn raise_sun(&mut self, delta: f32) {
        self.sun.position.y += delta;
    }

    pub fn blind_bottom(&self, index: usize) -> f32 {
        self.blinds[index]
    }

    pub fn blind_bottoms(&self) -> [f32; FIXTURE_COUNT] {
        self.blinds
    }

    /// Moves a blind's bottom edge, keeping it within the window.
    pub fn adjust_blind(&mut self, index: usize, delta: f32) {
        if let Some(bottom) = self.blinds.get_mut(index) {
            *bottom = (*bottom + delta).clamp(BLIND_MIN, BLIND_MAX);
        }
    }

    /// The three ceiling lights followed by the sun.
    pub fn point_lights(&self) -> [PointLight; FIXTURE_COUNT + 1] {
        let [back, centre, front] = self.ceiling;
        [back, centre, front, self.sun]
    }
}
