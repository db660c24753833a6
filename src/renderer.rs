//! Scene rendering with depth testing, per-draw uniforms and texture slots.
//!
//! [`Renderer`] turns a frame's [`DrawQueue`] into GPU draws. It uses three bind
//! groups:
//! - **Group 0**: scene uniforms (view-projection, camera position, ambient light,
//!   the four point lights, blind bottoms and window placement, texture switch)
//! - **Group 1**: model uniforms (model matrix, normal matrix, texture flag), one
//!   slot per draw addressed with a dynamic offset
//! - **Group 2**: texture and sampler for the draw's [`TextureSlot`]
//!
//! Meshes are cached by primitive and exact vertex color, so the whole classroom
//! needs only a few dozen small buffers. A mesh that fails to upload is logged once
//! and its draws are skipped.
//!
//! Frames are split in two calls: [`Renderer::prepare`] writes uniforms and
//! uploads meshes, then [`Renderer::render`] records the render pass.

use std::collections::{HashMap, HashSet};

use crate::camera::CameraState;
use crate::color::Color;
use crate::gpu::GpuContext;
use crate::layout::{self, WINDOW_CENTER_Y, WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::lighting::AMBIENT;
use crate::mesh::{Mesh, Primitive, Vertex3d};
use crate::scene::composer::{DrawCommand, DrawQueue};
use crate::scene::state::SceneState;
use crate::texture::{Texture, TextureSet, TextureSlot};

/// Sky blue behind the windows.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.49,
    g: 0.75,
    b: 0.93,
    a: 1.0,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Model slots allocated up front; grows to the next power of two when exceeded.
const INITIAL_MODEL_SLOTS: usize = 512;

/// Per-frame uniforms shared by every draw.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub ambient: f32,
    /// Three ceiling lights then the sun; `w` unused.
    pub light_positions: [[f32; 4]; 4],
    /// Emitted color per light, zero when switched off.
    pub light_colors: [[f32; 4]; 4],
    /// Bottom edge of the back, centre and front blinds; `w` unused.
    pub blind_bottoms: [f32; 4],
    /// Window centers along z (back, centre, front) and half the window width.
    pub window_z: [f32; 4],
    /// Window center height, half height, and the window wall's x.
    /// `w` is 1.0 while textures are enabled.
    pub window_frame: [f32; 4],
}

impl SceneUniforms {
    pub fn new(camera: &CameraState, state: &SceneState, aspect: f32) -> Self {
        let view_proj = camera.projection_matrix(aspect) * camera.view_matrix();
        let lights = state.lighting.point_lights();
        let blinds = state.lighting.blind_bottoms();
        let windows = layout::window_centers_z();

        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: camera.position.to_array(),
            ambient: AMBIENT,
            light_positions: lights.map(|l| l.position.extend(1.0).to_array()),
            light_colors: lights.map(|l| l.color().to_array()),
            blind_bottoms: [blinds[0], blinds[1], blinds[2], 0.0],
            window_z: [windows[0], windows[1], windows[2], WINDOW_WIDTH / 2.0],
            window_frame: [
                WINDOW_CENTER_Y,
                WINDOW_HEIGHT / 2.0,
                0.0,
                if state.textures_enabled { 1.0 } else { 0.0 },
            ],
        }
    }
}

/// Per-draw uniforms.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model`.
    pub normal_matrix: [[f32; 4]; 4],
    /// `x` is 1.0 when the draw samples its texture.
    pub flags: [f32; 4],
}

impl From<&DrawCommand> for ModelUniforms {
    fn from(command: &DrawCommand) -> Self {
        let textured = if command.material.texture.is_some() { 1.0 } else { 0.0 };
        Self {
            model: command.model.to_cols_array_2d(),
            normal_matrix: command.normal.to_cols_array_2d(),
            flags: [textured, 0.0, 0.0, 0.0],
        }
    }
}

/// Rounds `size` up to a multiple of `alignment`.
fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// Cache key for an uploaded primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct MeshKey {
    primitive: Primitive,
    color: [u32; 4],
}

impl MeshKey {
    fn new(primitive: Primitive, color: Color) -> Self {
        Self {
            primitive,
            color: color.to_bits(),
        }
    }
}

/// One resolved draw for the current frame.
#[derive(Clone, Copy, Debug)]
struct Batch {
    mesh: MeshKey,
    texture: Option<TextureSlot>,
    model_offset: u32,
}

pub struct Renderer {
    pipeline: wgpu::RenderPipeline,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    model_stride: u64,
    model_capacity: usize,
    model_bytes: Vec<u8>,
    /// Bound for draws without a texture.
    default_texture: wgpu::BindGroup,
    slot_textures: [Option<wgpu::BindGroup>; TextureSlot::COUNT],
    missing_slots: [bool; TextureSlot::COUNT],
    meshes: HashMap<MeshKey, Mesh>,
    failed_meshes: HashSet<MeshKey>,
    batches: Vec<Batch>,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl Renderer {
    pub fn new(gpu: &GpuContext, textures: &TextureSet) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        // Scene uniform buffer (group 0)
        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        // Model uniform buffer (group 1), one aligned slot per draw
        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ModelUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let model_stride = align_to(
            std::mem::size_of::<ModelUniforms>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let (model_buffer, model_bind_group) =
            Self::create_model_buffer(device, &model_layout, model_stride, INITIAL_MODEL_SLOTS);

        // Texture bind group layout (group 2)
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let white = Texture::white(gpu);
        let default_texture = Self::texture_bind_group(gpu, &texture_layout, &white);
        let slot_textures = TextureSlot::ALL.map(|slot| {
            textures
                .get(slot)
                .map(|texture| Self::texture_bind_group(gpu, &texture_layout, texture))
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&scene_layout, &model_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            // Planes are seen from both sides, so nothing is culled.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let depth_view = Self::create_depth_view(gpu);

        Self {
            pipeline,
            scene_buffer,
            scene_bind_group,
            model_layout,
            model_buffer,
            model_bind_group,
            model_stride,
            model_capacity: INITIAL_MODEL_SLOTS,
            model_bytes: Vec::new(),
            default_texture,
            slot_textures,
            missing_slots: [false; TextureSlot::COUNT],
            meshes: HashMap::new(),
            failed_meshes: HashSet::new(),
            batches: Vec::new(),
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
        }
    }

    fn create_model_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        slots: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniforms"),
            size: stride * slots as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ModelUniforms>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn texture_bind_group(
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        texture: &Texture,
    ) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }

    fn create_depth_view(gpu: &GpuContext) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Recreates the depth buffer if the surface changed size.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            self.depth_view = Self::create_depth_view(gpu);
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Number of distinct meshes uploaded so far.
    pub fn cached_meshes(&self) -> usize {
        self.meshes.len()
    }

    /// Writes this frame's uniforms and resolves every draw to a cached mesh.
    pub fn prepare(
        &mut self,
        gpu: &GpuContext,
        camera: &CameraState,
        state: &SceneState,
        draws: &DrawQueue,
    ) {
        self.ensure_depth_size(gpu);

        let scene = SceneUniforms::new(camera, state, gpu.aspect());
        gpu.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[scene]));

        if draws.len() > self.model_capacity {
            let slots = draws.len().next_power_of_two();
            let (buffer, bind_group) =
                Self::create_model_buffer(&gpu.device, &self.model_layout, self.model_stride, slots);
            self.model_buffer = buffer;
            self.model_bind_group = bind_group;
            self.model_capacity = slots;
            log::debug!("model uniform buffer grown to {slots} slots");
        }

        self.batches.clear();
        self.model_bytes.clear();
        let stride = self.model_stride as usize;

        for command in draws.iter() {
            let Some(mesh) = self.resolve_mesh(gpu, command) else {
                continue;
            };
            if let Some(slot) = command.material.texture {
                if self.slot_textures[slot.index()].is_none() {
                    if !self.missing_slots[slot.index()] {
                        self.missing_slots[slot.index()] = true;
                        log::warn!("no texture bound for {slot:?}; skipping its draws");
                    }
                    continue;
                }
            }

            let offset = self.model_bytes.len();
            let uniforms = ModelUniforms::from(command);
            self.model_bytes.extend_from_slice(bytemuck::bytes_of(&uniforms));
            self.model_bytes.resize(offset + stride, 0);

            self.batches.push(Batch {
                mesh,
                texture: command.material.texture,
                model_offset: offset as u32,
            });
        }

        if !self.model_bytes.is_empty() {
            gpu.queue.write_buffer(&self.model_buffer, 0, &self.model_bytes);
        }
        log::trace!(
            "prepared {} of {} draws ({} meshes cached)",
            self.batches.len(),
            draws.len(),
            self.meshes.len()
        );
    }

    /// Prepares a frame that only clears the screen.
    pub fn prepare_empty(&mut self, gpu: &GpuContext) {
        self.ensure_depth_size(gpu);
        self.batches.clear();
    }

    fn resolve_mesh(&mut self, gpu: &GpuContext, command: &DrawCommand) -> Option<MeshKey> {
        let key = MeshKey::new(command.primitive, command.material.color);
        if self.meshes.contains_key(&key) {
            return Some(key);
        }
        if self.failed_meshes.contains(&key) {
            return None;
        }
        let data = command.primitive.mesh_data(command.material.color);
        match Mesh::upload(gpu, &data) {
            Ok(mesh) => {
                self.meshes.insert(key, mesh);
                Some(key)
            }
            Err(e) => {
                log::warn!("skipping {:?} draw: {e}", command.primitive);
                self.failed_meshes.insert(key);
                None
            }
        }
    }

    /// Clears the target and draws everything prepared this frame.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.scene_bind_group, &[]);

        for batch in &self.batches {
            let Some(mesh) = self.meshes.get(&batch.mesh) else {
                continue;
            };
            let texture = batch
                .texture
                .and_then(|slot| self.slot_textures[slot.index()].as_ref())
                .unwrap_or(&self.default_texture);

            render_pass.set_bind_group(1, &self.model_bind_group, &[batch.model_offset]);
            render_pass.set_bind_group(2, texture, &[]);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::graph::Material;
    use glam::Mat4;

    #[test]
    fn uniform_blocks_keep_wgsl_alignment() {
        assert_eq!(std::mem::size_of::<SceneUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 256);
        assert_eq!(std::mem::size_of::<ModelUniforms>(), 144);
    }

    #[test]
    fn model_slots_round_up_to_the_offset_alignment() {
        assert_eq!(align_to(144, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(300, 256), 512);
        assert_eq!(align_to(144, 16), 144);
    }

    #[test]
    fn switched_off_lights_upload_as_black() {
        let mut state = SceneState::default();
        state.lighting.toggle_ceiling(1);
        let uniforms = SceneUniforms::new(&CameraState::default(), &state, 4.0 / 3.0);
        assert_eq!(uniforms.light_colors[1], Color::BLACK.to_array());
        assert_eq!(
            uniforms.light_colors[0],
            crate::lighting::CEILING_LIGHT.to_array()
        );
        assert_eq!(uniforms.light_colors[3], crate::lighting::SUN_LIGHT.to_array());
    }

    #[test]
    fn scene_uniforms_carry_blinds_and_texture_switch() {
        let mut state = SceneState::default();
        state.lighting.adjust_blind(2, -0.5);
        state.toggle_textures();
        let uniforms = SceneUniforms::new(&CameraState::default(), &state, 1.0);
        assert_eq!(uniforms.blind_bottoms[2], state.lighting.blind_bottom(2));
        assert_eq!(uniforms.blind_bottoms[0], crate::lighting::BLIND_MAX);
        assert_eq!(uniforms.window_frame[3], 0.0);
        assert_eq!(uniforms.window_z[3], WINDOW_WIDTH / 2.0);
        assert_eq!(uniforms.ambient, AMBIENT);
    }

    #[test]
    fn model_uniforms_flag_textured_draws() {
        let model = Mat4::from_scale(glam::Vec3::new(2.0, 1.0, 1.0));
        let command = DrawCommand {
            primitive: Primitive::Cube,
            material: Material::textured(Color::WHITE, TextureSlot::Beech),
            model,
            normal: model.inverse().transpose(),
        };
        let uniforms = ModelUniforms::from(&command);
        assert_eq!(uniforms.flags[0], 1.0);
        assert_eq!(uniforms.model, model.to_cols_array_2d());

        let flat = DrawCommand {
            material: Material::flat(Color::WHITE),
            ..command
        };
        assert_eq!(ModelUniforms::from(&flat).flags[0], 0.0);
    }

    #[test]
    fn mesh_keys_distinguish_color_and_shape() {
        let glass = Color::WHITE.with_alpha(0.25);
        assert_ne!(
            MeshKey::new(Primitive::Cube, Color::WHITE),
            MeshKey::new(Primitive::Cube, glass)
        );
        assert_ne!(
            MeshKey::new(Primitive::Cube, glass),
            MeshKey::new(Primitive::Plane, glass)
        );
        assert_eq!(
            MeshKey::new(Primitive::Plane, glass),
            MeshKey::new(Primitive::Plane, glass)
        );
    }
}
