//! Core GPU context and device management.
//!
//! [`GpuContext`] owns the wgpu surface, device, queue and surface configuration.
//! It is created once from the window and passed by reference to the renderer,
//! the texture loader and the HUD.

use std::sync::Arc;
use winit::window::Window;

use crate::error::InitError;

/// Core GPU context holding wgpu resources.
pub struct GpuContext {
    /// The surface for presenting rendered frames to the window.
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// Current surface configuration (format, size, present mode).
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Create a new GPU context from a winit window.
    ///
    /// Picks a primary backend adapter compatible with the window's surface,
    /// prefers an sRGB surface format, and presents with Fifo (vsync).
    pub fn new(window: Arc<Window>) -> Result<Self, InitError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;
        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Classroom Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format =
            choose_surface_format(&surface_caps.formats).ok_or(InitError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::debug!(
            "surface configured: {}x{} {:?}",
            config.width,
            config.height,
            config.format
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    /// Resize the surface to new dimensions.
    ///
    /// Ignores zero-sized dimensions, which occur while the window is minimized.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reapplies the current configuration after the surface was lost or outdated.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Returns the current aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }
}

/// Picks a non-sRGB format so colors are written to the screen as given.
///
/// Vertex colors, light colors and texture texels are all display-space values; an
/// sRGB surface would gamma-encode them a second time.
pub(crate) fn choose_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn surface_format_avoids_srgb() {
        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(choose_surface_format(&formats), Some(TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn surface_format_falls_back_to_first() {
        assert_eq!(
            choose_surface_format(&[TextureFormat::Rgba8UnormSrgb]),
            Some(TextureFormat::Rgba8UnormSrgb)
        );
        assert_eq!(choose_surface_format(&[]), None);
    }
}
