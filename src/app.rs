//! Window and event loop.
//!
//! [`run`] opens the window, brings up the GPU, loads textures and the HUD font,
//! then drives one [`Session`] tick and one redraw per `RedrawRequested`.

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::AppConfig;
use crate::error::{InitError, RunError};
use crate::gpu::GpuContext;
use crate::hud::{Hud, HudState};
use crate::input::Input;
use crate::renderer::Renderer;
use crate::scene::composer::Traversal;
use crate::session::Session;
use crate::texture::TextureSet;

/// Runs the classroom until the window is closed.
///
/// # Example
/// ```ignore
/// let event_loop = EventLoop::new()?;
/// classroom::run(event_loop, AppConfig::from_env())?;
/// ```
pub fn run(event_loop: EventLoop<()>, config: AppConfig) -> Result<(), RunError> {
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ClassroomApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        ClassroomApp::Failed(e) => Err(e.into()),
        _ => Ok(()),
    }
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    textures: TextureSet,
    renderer: Renderer,
    hud: Hud,
    input: Input,
    session: Session,
    last_frame: Instant,
}

enum ClassroomApp {
    Pending { config: AppConfig },
    Running(Box<Running>),
    Failed(InitError),
}

impl Running {
    fn start(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self, InitError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone())?;

        let textures = TextureSet::load(&gpu, &config.assets_dir, config.procedural_textures);
        let renderer = Renderer::new(&gpu, &textures);
        let hud = Hud::new(&gpu, config.font_path.as_deref());
        let session = Session::new(config.camera_lock);

        log::info!(
            "classroom ready: {}x{}, HUD {}",
            gpu.width(),
            gpu.height(),
            if hud.is_enabled() { "on" } else { "off" }
        );

        Ok(Self {
            window,
            gpu,
            textures,
            renderer,
            hud,
            input: Input::new(),
            session,
            last_frame: Instant::now(),
        })
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let frame_ms = now.duration_since(self.last_frame).as_secs_f32() * 1000.0;
        self.last_frame = now;

        let traversal = self.session.tick(&self.input, now, frame_ms);
        self.input.end_frame();

        let ready = self.textures.ready();
        if ready {
            self.renderer.prepare(
                &self.gpu,
                &self.session.camera,
                &self.session.state,
                self.session.draws(),
            );
        } else {
            self.renderer.prepare_empty(&self.gpu);
        }
        match hud_state(ready, &self.session, traversal) {
            Some(state) => self.hud.prepare(&self.gpu, state),
            None => self.hud.hide(),
        }

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated; reconfiguring");
                self.gpu.reconfigure();
                return;
            }
            Err(e) => {
                log::warn!("skipping frame: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        self.renderer.render(&mut encoder, &view);
        self.hud.render(&mut encoder, &view);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

/// The overlay shares the scene's texture gate: nothing is drawn until it opens.
fn hud_state(textures_ready: bool, session: &Session, traversal: Traversal) -> Option<HudState> {
    textures_ready.then(|| HudState {
        instructions_visible: session.state.instructions_visible,
        chair_in_range: traversal.in_range,
    })
}

impl ApplicationHandler for ClassroomApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let ClassroomApp::Pending { config } = self else {
            return;
        };
        *self = match Running::start(event_loop, config) {
            Ok(running) => {
                running.window.request_redraw();
                ClassroomApp::Running(Box::new(running))
            }
            Err(e) => {
                event_loop.exit();
                ClassroomApp::Failed(e)
            }
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let ClassroomApp::Running(app) = self else {
            return;
        };

        app.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                app.gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                app.redraw();
                app.window.request_redraw();
            }
            _ => {}
        }
    }
}
