//! # Classroom
//!
//! An interactive first-person walk through a furnished classroom, rendered with
//! wgpu.
//!
//! The room is a fixed tree of cubes and planes ([`scene::classroom::build`])
//! interpreted every frame by a transform-stack [`scene::composer::Composer`].
//! Chairs slide in and out on request, the door swings open as the viewer
//! approaches, and lights, blinds, whiteboards and the sun are all adjustable from
//! the keyboard.
//!
//! ```no_run
//! use classroom::AppConfig;
//! use winit::event_loop::EventLoop;
//!
//! let event_loop = EventLoop::new().expect("event loop");
//! classroom::run(event_loop, AppConfig::new().procedural_textures(true)).unwrap();
//! ```
//!
//! Everything except [`app`], [`gpu`], [`renderer`] and [`hud`] runs without a GPU,
//! which is how the tests exercise it.

pub mod animation;
pub mod app;
pub mod camera;
pub mod color;
pub mod config;
pub mod error;
pub mod gpu;
pub mod hud;
pub mod input;
pub mod interaction;
pub mod layout;
pub mod lighting;
pub mod mesh;
pub mod renderer;
pub mod scene;
pub mod session;
pub mod texture;
pub mod transform_stack;

pub use app::run;
pub use camera::{CameraController, CameraState};
pub use color::Color;
pub use config::AppConfig;
pub use error::{FontError, InitError, MeshError, RunError, TextureError};
pub use gpu::GpuContext;
pub use input::Input;
pub use layout::ChairId;
pub use session::Session;
pub use texture::TextureSlot;

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec3};
