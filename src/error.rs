//! Error types for the classroom renderer.
//!
//! Errors fall into three groups with different handling:
//!
//! - [`InitError`]: window, surface, adapter or device acquisition failed. Fatal:
//!   the application logs the diagnostic and exits.
//! - [`MeshError`]: a single primitive could not be uploaded. Non-fatal: the object
//!   is skipped for the frame and the rest of the scene still draws.
//! - [`TextureError`] / [`FontError`]: an asset could not be loaded. The texture gate
//!   never opens (the scene stays blank) or the HUD is disabled; both are logged.
//!
//! Programmer errors (an unbalanced transform stack, popping an empty stack) are not
//! represented here: they panic.

use thiserror::Error;

/// Failure while bringing up the window and GPU.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

/// Failure while validating or uploading a primitive mesh.
#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("mesh has no vertices or no indices")]
    Empty,

    #[error("attribute `{attribute}` has {found} entries, expected {expected}")]
    AttributeLength {
        attribute: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),

    #[error("buffer of {size} bytes exceeds device limit of {limit} bytes")]
    BufferTooLarge { size: u64, limit: u64 },
}

/// Failure while loading one of the scene textures.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode texture `{path}`: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("texture `{path}` has zero size")]
    ZeroSize { path: String },

    #[error("texture `{path}` is {width}x{height}, over the device limit of {limit}")]
    TooLarge {
        path: String,
        width: u32,
        height: u32,
        limit: u32,
    },
}

/// Failure while loading the HUD font.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse font: {0}")]
    Parse(&'static str),
}

/// Failure that ends the application.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error(transparent)]
    Init(#[from] InitError),
}
