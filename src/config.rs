//! Startup configuration.

use std::path::PathBuf;

/// Directory holding the seven texture files.
pub const ASSETS_ENV: &str = "CLASSROOM_ASSETS";
/// Path to a TTF/OTF font for the HUD.
pub const FONT_ENV: &str = "CLASSROOM_FONT";
/// Set to `1`/`true` to generate textures instead of loading files.
pub const PROCEDURAL_ENV: &str = "CLASSROOM_PROCEDURAL_TEXTURES";

/// Configuration for the classroom window.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub assets_dir: PathBuf,
    /// HUD font; common system fonts are tried when unset.
    pub font_path: Option<PathBuf>,
    pub procedural_textures: bool,
    /// Whether the camera starts confined to the room.
    pub camera_lock: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Classroom".to_string(),
            width: 800,
            height: 600,
            assets_dir: PathBuf::from("textures"),
            font_path: None,
            procedural_textures: false,
            camera_lock: true,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with overrides from the process environment.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, keyed by the `*_ENV` variable names.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(ASSETS_ENV).filter(|v| !v.is_empty()) {
            self.assets_dir = PathBuf::from(dir);
        }
        if let Some(font) = lookup(FONT_ENV).filter(|v| !v.is_empty()) {
            self.font_path = Some(PathBuf::from(font));
        }
        if let Some(value) = lookup(PROCEDURAL_ENV) {
            match parse_flag(&value) {
                Some(flag) => self.procedural_textures = flag,
                None => log::warn!("ignoring {PROCEDURAL_ENV}={value:?}: expected a boolean"),
            }
        }
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    pub fn font(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    pub fn procedural_textures(mut self, enabled: bool) -> Self {
        self.procedural_textures = enabled;
        self
    }

    pub fn camera_lock(mut self, locked: bool) -> Self {
        self.camera_lock = locked;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
