//! Fixed room dimensions and fixture placement.
//!
//! One unit is one meter. The room was measured in feet, so most literals are
//! expressed as a number of feet times [`FOOT`].
//!
//! World axes: the room floor spans `x ∈ [0, WIDTH]`, `z ∈ [0, LENGTH]`, with the
//! ceiling at `y = HEIGHT`. The camera starts near `z = 0` looking along `+z`
//! toward the whiteboards. The windows are in the `x = 0` wall and the door is in
//! the `x = WIDTH` wall.

use glam::Vec3;

/// One foot in meters (rounded, as used throughout the scene).
pub const FOOT: f32 = 0.3;

/// Interior width (16 ft plus wall allowance).
pub const WIDTH: f32 = 16.0 * FOOT + 0.08;
/// Interior length, back wall to front wall (28 ft).
pub const LENGTH: f32 = 28.0 * FOOT;
/// Floor to ceiling (10 ft).
pub const HEIGHT: f32 = 10.0 * FOOT;

/// Number of chairs (and tables) in the seating grid.
pub const CHAIR_COUNT: usize = 18;
/// Number of whiteboard pairs, blinds and ceiling lights.
pub const FIXTURE_COUNT: usize = 3;

/// Width and height of each window opening.
pub const WINDOW_WIDTH: f32 = 2.4;
pub const WINDOW_HEIGHT: f32 = 1.2;
/// Height of the center of each window pane.
pub const WINDOW_CENTER_Y: f32 = 1.5;

/// Door opening width and height.
pub const DOOR_WIDTH: f32 = 0.84;
pub const DOOR_HEIGHT: f32 = 1.98;
/// Distance of the door center from the middle of the room, along the room length.
pub const DOOR_OFFSET: f32 = 1.65;

/// Where the seating grid's local origin sits in the room.
pub const FURNITURE_ORIGIN: Vec3 = Vec3::new(0.31, 0.0, 1.05);

/// Camera clamping margins used while the camera lock is on.
pub const WALL_MARGIN: f32 = 0.25;
pub const FLOOR_CEILING_MARGIN: f32 = 0.2;

/// Index of one chair in the seating grid, in traversal order.
///
/// Chairs are numbered bank by bank (the bank by the windows first), row by row
/// from the back, and by increasing `x` within a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChairId(usize);

impl ChairId {
    pub fn new(index: usize) -> Option<Self> {
        (index < CHAIR_COUNT).then_some(Self(index))
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn all() -> impl Iterator<Item = ChairId> {
        (0..CHAIR_COUNT).map(ChairId)
    }
}

impl std::fmt::Display for ChairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chair #{}", self.0)
    }
}

/// Width of the wall strips separating the three windows.
pub fn window_strip_width() -> f32 {
    (LENGTH - 3.0 * WINDOW_WIDTH) / 4.0
}

/// World-space center of the room's floor.
pub fn room_center() -> Vec3 {
    Vec3::new(WIDTH / 2.0, 0.0, LENGTH / 2.0)
}

/// World-space x/z of the door's proximity trigger point.
pub fn door_trigger_point() -> (f32, f32) {
    (WIDTH, LENGTH / 2.0 + DOOR_OFFSET)
}

/// World-space z of each window center (back, centre, front).
pub fn window_centers_z() -> [f32; FIXTURE_COUNT] {
    let mid = LENGTH / 2.0;
    [mid - (LENGTH / 2.0 - 1.5), mid, mid + (LENGTH / 2.0 - 1.5)]
}
