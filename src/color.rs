/// Display-space RGBA color used for vertex colors, light colors and HUD text.
///
/// Channels are written to the surface unconverted, so `rgb8(122, ..)` shows as 122.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Opaque color from 8-bit channels.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    /// Semi-transparent dark background for the instruction panel.
    pub const PANEL_BG: Color = Color::rgba(0.05, 0.05, 0.08, 0.6);

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Exact bit pattern, used as a hash key for cached meshes.
    pub fn to_bits(self) -> [u32; 4] {
        [
            self.r.to_bits(),
            self.g.to_bits(),
            self.b.to_bits(),
            self.a.to_bits(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_byte(channel: f32) -> u8 {
        (channel * 255.0).round() as u8
    }

    #[test]
    fn rgb8_channels_reach_the_screen_unchanged() {
        let floor = Color::rgb8(122, 126, 140);
        assert_eq!(
            [to_byte(floor.r), to_byte(floor.g), to_byte(floor.b)],
            [122, 126, 140]
        );
        assert_eq!(floor.a, 1.0);
    }

    #[test]
    fn with_alpha_keeps_the_channels() {
        let glass = Color::WHITE.with_alpha(0.25);
        assert_eq!(glass.to_array(), [1.0, 1.0, 1.0, 0.25]);
    }
}
