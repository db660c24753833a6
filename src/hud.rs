//! 2D overlay: the instruction panel and the chair prompt.
//!
//! Text is drawn from a fontdue glyph atlas. Layout happens on the CPU into a
//! [`HudBatch`] of screen-space quads (pixels, origin top-left), which [`Hud`]
//! uploads and draws over the finished scene. Without a usable font the HUD is
//! disabled and the scene still renders.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};

use crate::color::Color;
use crate::error::FontError;
use crate::gpu::GpuContext;

/// Key and description rows of the instruction panel.
pub const INSTRUCTIONS: [(&str, &str); 12] = [
    ("w/s", "Move forwards/ backwards"),
    ("a/d", "Move left/ right"),
    ("q/e", "Move up/ down"),
    ("Arrow keys", "Look around"),
    ("1, 2, 3", "Trigger back/ centre/ front lights"),
    ("4, 5, 6", "Switch left/ centre/ right boards"),
    ("SHIFT  4, 5, 6", "Reverse board motion"),
    ("7, 8, 9", "Pull back/ centre/ front blind down"),
    ("SHIFT  7, 8, 9", "Pull back/ centre/ front blind up"),
    ("p/o", "Raise/ lower sun altitude"),
    ("0", "Toggle textures"),
    ("ENTER", "Toggle instructions"),
];

pub const PROMPT: &str = "SPACE to move chair";

/// Fonts tried when no font path is configured.
pub const FALLBACK_FONTS: [&str; 5] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Pixel size glyphs are rasterized at.
const ATLAS_SIZE: f32 = 18.0;
const PANEL_SCALE: f32 = 0.75;
const PROMPT_SCALE: f32 = 1.0;
const MARGIN: f32 = 10.0;
const COLUMN_GAP: f32 = 14.0;

const MAX_VERTICES: usize = 16384;

/// Vertex for 2D text and panel rendering.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex2d {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex2d {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex2d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
            // color
            wgpu::VertexAttribute {
                offset: 16,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    };
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct HudUniforms {
    resolution: [f32; 2],
    _padding: [f32; 2],
}

/// Information about a single glyph in the font atlas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphInfo {
    /// UV rectangle in the atlas (x, y, width, height), normalized to [0, 1].
    pub uv: [f32; 4],
    pub width: u32,
    pub height: u32,
    /// Offset from the cursor to the glyph's bottom-left corner.
    pub offset_x: f32,
    pub offset_y: f32,
    pub advance: f32,
}

/// Glyph metrics for one rasterized font size.
#[derive(Clone, Debug, Default)]
pub struct GlyphTable {
    glyphs: HashMap<char, GlyphInfo>,
    size: f32,
    line_height: f32,
}

impl GlyphTable {
    pub fn new(glyphs: HashMap<char, GlyphInfo>, size: f32, line_height: f32) -> Self {
        Self {
            glyphs,
            size,
            line_height,
        }
    }

    pub fn glyph(&self, c: char) -> Option<&GlyphInfo> {
        self.glyphs.get(&c)
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Width of `text` in pixels at `scale`.
    pub fn measure(&self, text: &str, scale: f32) -> f32 {
        text.chars()
            .map(|c| self.glyph(c).map_or(self.size * 0.5, |g| g.advance))
            .sum::<f32>()
            * scale
    }
}

/// Places rectangles of the given sizes in rows, doubling the smaller atlas
/// dimension until everything fits. Returns the atlas size and each origin.
pub(crate) fn pack_glyphs(sizes: &[(u32, u32)], padding: u32) -> ((u32, u32), Vec<(u32, u32)>) {
    let mut atlas = (256u32, 256u32);
    loop {
        if let Some(origins) = try_pack(sizes, padding, atlas) {
            return (atlas, origins);
        }
        if atlas.0 <= atlas.1 {
            atlas.0 *= 2;
        } else {
            atlas.1 *= 2;
        }
    }
}

fn try_pack(sizes: &[(u32, u32)], padding: u32, atlas: (u32, u32)) -> Option<Vec<(u32, u32)>> {
    let mut origins = Vec::with_capacity(sizes.len());
    let (mut x, mut y) = (padding, padding);
    let mut row_height = 0;
    for &(w, h) in sizes {
        if w + 2 * padding > atlas.0 {
            return None;
        }
        if x + w + padding > atlas.0 {
            x = padding;
            y += row_height + padding;
            row_height = 0;
        }
        if y + h + padding > atlas.1 {
            return None;
        }
        origins.push((x, y));
        x += w + padding;
        row_height = row_height.max(h);
    }
    Some(origins)
}

/// A font rasterized into a single-channel GPU atlas.
pub struct FontAtlas {
    table: GlyphTable,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl FontAtlas {
    /// Rasterizes printable ASCII from TTF/OTF data.
    pub fn new(gpu: &GpuContext, font_data: &[u8], size: f32) -> Result<Self, FontError> {
        let font = Font::from_bytes(font_data, FontSettings::default()).map_err(FontError::Parse)?;

        let rasterized: Vec<(char, fontdue::Metrics, Vec<u8>)> = (32u8..=126u8)
            .map(|c| {
                let (metrics, bitmap) = font.rasterize(c as char, size);
                (c as char, metrics, bitmap)
            })
            .collect();

        let sizes: Vec<(u32, u32)> = rasterized
            .iter()
            .map(|(_, m, _)| (m.width as u32, m.height as u32))
            .collect();
        let ((atlas_width, atlas_height), origins) = pack_glyphs(&sizes, 1);

        let mut atlas_data = vec![0u8; (atlas_width * atlas_height) as usize];
        let mut glyphs = HashMap::new();

        for ((c, metrics, bitmap), &(x, y)) in rasterized.iter().zip(&origins) {
            let glyph_w = metrics.width as u32;
            let glyph_h = metrics.height as u32;

            for gy in 0..glyph_h {
                let src = (gy * glyph_w) as usize;
                let dst = ((y + gy) * atlas_width + x) as usize;
                atlas_data[dst..dst + glyph_w as usize]
                    .copy_from_slice(&bitmap[src..src + glyph_w as usize]);
            }

            glyphs.insert(
                *c,
                GlyphInfo {
                    uv: [
                        x as f32 / atlas_width as f32,
                        y as f32 / atlas_height as f32,
                        glyph_w as f32 / atlas_width as f32,
                        glyph_h as f32 / atlas_height as f32,
                    ],
                    width: glyph_w,
                    height: glyph_h,
                    offset_x: metrics.xmin as f32,
                    offset_y: metrics.ymin as f32,
                    advance: metrics.advance_width,
                },
            );
        }

        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Font Atlas"),
            size: wgpu::Extent3d {
                width: atlas_width,
                height: atlas_height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &atlas_data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(atlas_width),
                rows_per_image: Some(atlas_height),
            },
            wgpu::Extent3d {
                width: atlas_width,
                height: atlas_height,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Font Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let line_height = font
            .horizontal_line_metrics(size)
            .map(|m| m.new_line_size)
            .unwrap_or(size * 1.2);

        Ok(Self {
            table: GlyphTable::new(glyphs, size, line_height),
            view,
            sampler,
        })
    }

    pub fn load(gpu: &GpuContext, path: &Path, size: f32) -> Result<Self, FontError> {
        let data = std::fs::read(path)?;
        Self::new(gpu, &data, size)
    }

    pub fn table(&self) -> &GlyphTable {
        &self.table
    }
}

/// Screen-space quads for one frame.
#[derive(Debug, Default)]
pub struct HudBatch {
    colored: Vec<Vertex2d>,
    text: Vec<Vertex2d>,
}

impl HudBatch {
    pub fn clear(&mut self) {
        self.colored.clear();
        self.text.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.colored.is_empty() && self.text.is_empty()
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        push_quad(&mut self.colored, [x, y, x + w, y + h], [0.0; 4], color);
    }

    /// Lays out `text` with its top-left corner at (`x`, `y`).
    pub fn text(&mut self, glyphs: &GlyphTable, x: f32, y: f32, text: &str, scale: f32, color: Color) {
        let mut cursor_x = x;
        let baseline_y = y + glyphs.size() * scale;

        for ch in text.chars() {
            let Some(glyph) = glyphs.glyph(ch) else {
                cursor_x += glyphs.size() * 0.5 * scale;
                continue;
            };

            if glyph.width > 0 && glyph.height > 0 {
                let gx = cursor_x + glyph.offset_x * scale;
                let gy = baseline_y - (glyph.offset_y + glyph.height as f32) * scale;
                let gw = glyph.width as f32 * scale;
                let gh = glyph.height as f32 * scale;
                let [u, v, du, dv] = glyph.uv;
                push_quad(&mut self.text, [gx, gy, gx + gw, gy + gh], [u, v, u + du, v + dv], color);
            }

            cursor_x += glyph.advance * scale;
        }
    }
}

/// Two triangles covering `rect` (x0, y0, x1, y1) with matching `uv` corners.
fn push_quad(out: &mut Vec<Vertex2d>, rect: [f32; 4], uv: [f32; 4], color: Color) {
    let [x0, y0, x1, y1] = rect;
    let [u0, v0, u1, v1] = uv;
    let color = color.to_array();
    let v = |x, y, u, v| Vertex2d {
        position: [x, y],
        uv: [u, v],
        color,
    };
    out.extend_from_slice(&[
        v(x0, y0, u0, v0),
        v(x1, y0, u1, v0),
        v(x0, y1, u0, v1),
        v(x1, y0, u1, v0),
        v(x1, y1, u1, v1),
        v(x0, y1, u0, v1),
    ]);
}

/// What the overlay should show this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HudState {
    pub instructions_visible: bool,
    pub chair_in_range: bool,
}

/// Fills `batch` for a screen of `width` by `height` pixels.
pub fn layout(batch: &mut HudBatch, glyphs: &GlyphTable, state: HudState, width: f32, height: f32) {
    batch.clear();

    if state.instructions_visible {
        let line = glyphs.line_height() * PANEL_SCALE;
        let key_column = INSTRUCTIONS
            .iter()
            .map(|(key, _)| glyphs.measure(key, PANEL_SCALE))
            .fold(0.0f32, f32::max);
        let text_column = INSTRUCTIONS
            .iter()
            .map(|(_, text)| glyphs.measure(text, PANEL_SCALE))
            .fold(0.0f32, f32::max);
        let panel_w = key_column + COLUMN_GAP + text_column + 2.0 * MARGIN;
        let panel_h = line * (INSTRUCTIONS.len() as f32 + 1.5) + 2.0 * MARGIN;
        batch.rect(0.0, 0.0, panel_w, panel_h, Color::PANEL_BG);

        let title = "Instructions";
        let title_x = (panel_w - glyphs.measure(title, PANEL_SCALE)) / 2.0;
        batch.text(glyphs, title_x, MARGIN, title, PANEL_SCALE, Color::WHITE);

        for (row, (key, text)) in INSTRUCTIONS.iter().enumerate() {
            let y = MARGIN + line * (row as f32 + 1.5);
            batch.text(glyphs, MARGIN, y, key, PANEL_SCALE, Color::WHITE);
            let x = MARGIN + key_column + COLUMN_GAP;
            batch.text(glyphs, x, y, text, PANEL_SCALE, Color::WHITE);
        }
    }

    if state.chair_in_range {
        let x = (width - glyphs.measure(PROMPT, PROMPT_SCALE)) / 2.0;
        let y = height * 0.8;
        batch.text(glyphs, x, y, PROMPT, PROMPT_SCALE, Color::WHITE);
    }
}

/// Loads the configured font, or the first fallback that exists.
fn load_font(gpu: &GpuContext, configured: Option<&Path>) -> Option<FontAtlas> {
    let candidates: Vec<PathBuf> = match configured {
        Some(path) => vec![path.to_path_buf()],
        None => FALLBACK_FONTS.iter().map(PathBuf::from).collect(),
    };

    for path in candidates.iter().filter(|p| configured.is_some() || p.exists()) {
        match FontAtlas::load(gpu, path, ATLAS_SIZE) {
            Ok(atlas) => {
                log::info!("HUD font: {}", path.display());
                return Some(atlas);
            }
            Err(e) => log::warn!("HUD font {}: {e}", path.display()),
        }
    }
    log::warn!("no usable HUD font; instructions and prompts are disabled");
    None
}

/// GPU side of the overlay.
pub struct Hud {
    colored_pipeline: wgpu::RenderPipeline,
    textured_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    font_bind_group: Option<wgpu::BindGroup>,
    font: Option<FontAtlas>,
    batch: HudBatch,
}

impl Hud {
    pub fn new(gpu: &GpuContext, font_path: Option<&Path>) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("HUD Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/hud.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("HUD Uniforms"),
            size: std::mem::size_of::<HudUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("HUD Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("HUD Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("HUD Texture Layout"),
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

        let colored_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("HUD Colored Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });
        let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("HUD Textured Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let blend_state = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let pipeline = |label: &str, layout: &wgpu::PipelineLayout, fragment: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs"),
                    buffers: &[Vertex2d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fragment),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.config.format,
                        blend: Some(blend_state),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };
        let colored_pipeline = pipeline("HUD Colored Pipeline", &colored_layout, "fs_colored");
        let textured_pipeline = pipeline("HUD Textured Pipeline", &textured_layout, "fs_textured");

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("HUD Vertex Buffer"),
            size: (MAX_VERTICES * std::mem::size_of::<Vertex2d>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let font = load_font(gpu, font_path);
        let font_bind_group = font.as_ref().map(|font| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Font Bind Group"),
                layout: &texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&font.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&font.sampler),
                    },
                ],
            })
        });

        Self {
            colored_pipeline,
            textured_pipeline,
            vertex_buffer,
            uniform_buffer,
            uniform_bind_group,
            font_bind_group,
            font,
            batch: HudBatch::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.font.is_some()
    }

    /// Lays out this frame's overlay and uploads it.
    pub fn prepare(&mut self, gpu: &GpuContext, state: HudState) {
        let Some(font) = &self.font else {
            return;
        };
        let (width, height) = (gpu.width() as f32, gpu.height() as f32);
        layout(&mut self.batch, font.table(), state, width, height);

        let total = self.batch.colored.len() + self.batch.text.len();
        if total > MAX_VERTICES {
            log::warn!("HUD needs {total} vertices, limit is {MAX_VERTICES}; skipping overlay");
            self.batch.clear();
            return;
        }

        let uniforms = HudUniforms {
            resolution: [width, height],
            _padding: [0.0; 2],
        };
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
        if !self.batch.colored.is_empty() {
            gpu.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.batch.colored));
        }
        if !self.batch.text.is_empty() {
            let offset = (self.batch.colored.len() * std::mem::size_of::<Vertex2d>()) as u64;
            gpu.queue
                .write_buffer(&self.vertex_buffer, offset, bytemuck::cast_slice(&self.batch.text));
        }
    }

    /// Drops the prepared overlay so nothing is drawn this frame.
    pub fn hide(&mut self) {
        self.batch.clear();
    }

    /// Draws the prepared overlay on top of `target`.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        if self.batch.is_empty() {
            return;
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("HUD Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        let colored = self.batch.colored.len() as u32;
        if colored > 0 {
            render_pass.set_pipeline(&self.colored_pipeline);
            render_pass.draw(0..colored, 0..1);
        }

        if let Some(font_bind_group) = &self.font_bind_group {
            let text = self.batch.text.len() as u32;
            if text > 0 {
                render_pass.set_pipeline(&self.textured_pipeline);
                render_pass.set_bind_group(1, font_bind_group, &[]);
                render_pass.draw(colored..colored + text, 0..1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Monospace table: every printable char is 6x8 with a 7px advance; space is blank.
    fn mono_table() -> GlyphTable {
        let glyphs = (33u8..=126u8)
            .map(|c| {
                (
                    c as char,
                    GlyphInfo {
                        uv: [0.0, 0.0, 0.1, 0.1],
                        width: 6,
                        height: 8,
                        offset_x: 0.0,
                        offset_y: 0.0,
                        advance: 7.0,
                    },
                )
            })
            .chain(std::iter::once((
                ' ',
                GlyphInfo {
                    uv: [0.0; 4],
                    width: 0,
                    height: 0,
                    offset_x: 0.0,
                    offset_y: 0.0,
                    advance: 7.0,
                },
            )))
            .collect();
        GlyphTable::new(glyphs, 10.0, 12.0)
    }

    #[test]
    fn text_emits_one_quad_per_visible_glyph() {
        let mut batch = HudBatch::default();
        batch.text(&mono_table(), 0.0, 0.0, "a b", 1.0, Color::WHITE);
        assert_eq!(batch.text.len(), 2 * 6);
        // second glyph starts after two advances
        assert_eq!(batch.text[6].position[0], 14.0);
        // glyph bottoms sit on the baseline
        assert_eq!(batch.text[2].position[1], 10.0);
    }

    #[test]
    fn measure_scales_advances() {
        let table = mono_table();
        assert_eq!(table.measure("abc", 1.0), 21.0);
        assert_eq!(table.measure("abc", 0.5), 10.5);
        // unknown glyphs advance half the font size
        assert_eq!(table.measure("\u{263A}", 1.0), 5.0);
    }

    #[test]
    fn hidden_instructions_and_no_target_draw_nothing() {
        let mut batch = HudBatch::default();
        layout(&mut batch, &mono_table(), HudState::default(), 800.0, 600.0);
        assert!(batch.is_empty());
    }

    #[test]
    fn instruction_panel_has_background_and_every_row() {
        let mut batch = HudBatch::default();
        let state = HudState {
            instructions_visible: true,
            chair_in_range: false,
        };
        layout(&mut batch, &mono_table(), state, 800.0, 600.0);
        assert_eq!(batch.colored.len(), 6);
        let visible: usize = std::iter::once("Instructions")
            .chain(INSTRUCTIONS.iter().flat_map(|(k, t)| [*k, *t]))
            .map(|s| s.chars().filter(|c| *c != ' ').count())
            .sum();
        assert_eq!(batch.text.len(), visible * 6);
    }

    #[test]
    fn prompt_is_centred_near_the_bottom() {
        let mut batch = HudBatch::default();
        let state = HudState {
            instructions_visible: false,
            chair_in_range: true,
        };
        layout(&mut batch, &mono_table(), state, 800.0, 600.0);
        assert!(batch.colored.is_empty());
        let width = mono_table().measure(PROMPT, 1.0);
        assert_eq!(batch.text[0].position[0], (800.0 - width) / 2.0);
        assert!(batch.text.iter().all(|v| v.position[1] >= 480.0));
    }

    #[test]
    fn packing_keeps_glyphs_inside_and_apart() {
        let sizes = vec![(40, 30); 60];
        let ((w, h), origins) = pack_glyphs(&sizes, 1);
        assert_eq!(origins.len(), sizes.len());
        for (i, &(x, y)) in origins.iter().enumerate() {
            assert!(x + 40 < w && y + 30 < h);
            for &(ox, oy) in &origins[i + 1..] {
                let apart = x + 40 < ox || ox + 40 < x || y + 30 < oy || oy + 30 < y;
                assert!(apart, "glyphs at ({x},{y}) and ({ox},{oy}) overlap");
            }
        }
    }
}
