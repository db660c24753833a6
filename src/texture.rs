//! Scene textures: the seven named texture slots, GPU upload and the load gate.

use std::path::Path;

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::error::TextureError;
use crate::gpu::GpuContext;

/// One of the textures the classroom samples from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    WoodFloor,
    Beech,
    Whiteboard,
    Door,
    Carpet,
    Fabric,
    PodiumFront,
}

impl TextureSlot {
    pub const COUNT: usize = 7;

    pub const ALL: [TextureSlot; Self::COUNT] = [
        TextureSlot::WoodFloor,
        TextureSlot::Beech,
        TextureSlot::Whiteboard,
        TextureSlot::Door,
        TextureSlot::Carpet,
        TextureSlot::Fabric,
        TextureSlot::PodiumFront,
    ];

    /// Texture unit, 0 through 6.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn file_name(self) -> &'static str {
        match self {
            TextureSlot::WoodFloor => "woodfloor.jpg",
            TextureSlot::Beech => "beech.jpg",
            TextureSlot::Whiteboard => "whiteboard.jpg",
            TextureSlot::Door => "door.png",
            TextureSlot::Carpet => "carpet.png",
            TextureSlot::Fabric => "fabric.jpg",
            TextureSlot::PodiumFront => "podium_front.png",
        }
    }

    /// Generates a stand-in for this slot's image file.
    pub fn procedural(self, size: u32) -> RgbaImage {
        let seed = self.index() as u32 * 7919 + 17;
        match self {
            TextureSlot::WoodFloor => planks(size, seed, [150, 105, 60], 8),
            TextureSlot::Beech => grain(size, seed, [214, 176, 128]),
            TextureSlot::Whiteboard => whiteboard(size, seed),
            TextureSlot::Door => panelled(size, seed, [120, 78, 44]),
            TextureSlot::Carpet => speckle(size, seed, &[[70, 80, 96], [60, 68, 84], [82, 92, 108]]),
            TextureSlot::Fabric => weave(size, seed, [40, 52, 110]),
            TextureSlot::PodiumFront => panelled(size, seed, [176, 132, 86]),
        }
    }
}

/// Texels are sampled as stored, matching the display-space vertex colors.
pub(crate) const TEXEL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a single-level texture from raw RGBA data.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        Self::with_mips(gpu, data, width, height, 1, label)
    }

    /// Create a mipmapped texture from an image. Rows are flipped so that `v = 0`
    /// samples the bottom of the picture.
    pub fn from_image(gpu: &GpuContext, image: &RgbaImage, label: &str) -> Self {
        let mut flipped = image.clone();
        imageops::flip_vertical_in_place(&mut flipped);
        let (data, levels) = mip_chain(flipped);
        Self::with_mips(gpu, &data, image.width(), image.height(), levels, label)
    }

    /// Load a texture from an image file.
    pub fn from_file(gpu: &GpuContext, path: &Path) -> Result<Self, TextureError> {
        let label = path.display().to_string();
        let image = image::open(path)
            .map_err(|source| TextureError::Decode {
                path: label.clone(),
                source,
            })?
            .to_rgba8();
        check_dimensions(
            &label,
            image.width(),
            image.height(),
            gpu.device.limits().max_texture_dimension_2d,
        )?;
        Ok(Self::from_image(gpu, &image, &label))
    }

    /// A 1x1 opaque white texture, bound when a draw has no texture.
    pub fn white(gpu: &GpuContext) -> Self {
        Self::from_rgba(gpu, &[255, 255, 255, 255], 1, 1, "White Texture")
    }

    fn with_mips(
        gpu: &GpuContext,
        data: &[u8],
        width: u32,
        height: u32,
        mip_level_count: u32,
        label: &str,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: TEXEL_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }
}

/// Rejects images the device cannot hold as a single 2D texture.
fn check_dimensions(path: &str, width: u32, height: u32, limit: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroSize {
            path: path.to_string(),
        });
    }
    if width > limit || height > limit {
        return Err(TextureError::TooLarge {
            path: path.to_string(),
            width,
            height,
            limit,
        });
    }
    Ok(())
}

/// Concatenates every mip level of `image`, largest first, and returns the bytes
/// with the level count.
fn mip_chain(image: RgbaImage) -> (Vec<u8>, u32) {
    let mut data = Vec::new();
    let mut levels = 1;
    let mut level = image;
    loop {
        data.extend_from_slice(level.as_raw());
        let (w, h) = level.dimensions();
        if w == 1 && h == 1 {
            break;
        }
        level = imageops::resize(&level, (w / 2).max(1), (h / 2).max(1), FilterType::Triangle);
        levels += 1;
    }
    (data, levels)
}

/// Counts loaded textures; the scene draws only once all of them are present.
#[derive(Debug, Default)]
pub struct LoadGate {
    loaded: [bool; TextureSlot::COUNT],
    stall_reported: bool,
}

impl LoadGate {
    pub const REQUIRED: usize = TextureSlot::COUNT;

    pub fn mark_loaded(&mut self, slot: TextureSlot) {
        self.loaded[slot.index()] = true;
    }

    pub fn loaded(&self) -> usize {
        self.loaded.iter().filter(|&&l| l).count()
    }

    pub fn is_open(&self) -> bool {
        self.loaded() == Self::REQUIRED
    }

    /// Returns whether the scene may draw. The first closed poll logs a warning.
    pub fn poll(&mut self) -> bool {
        let open = self.is_open();
        if !open && !self.stall_reported {
            self.stall_reported = true;
            let missing: Vec<&str> = TextureSlot::ALL
                .iter()
                .filter(|slot| !self.loaded[slot.index()])
                .map(|slot| slot.file_name())
                .collect();
            log::warn!(
                "scene not drawn: {}/{} textures loaded, missing {}",
                self.loaded(),
                Self::REQUIRED,
                missing.join(", ")
            );
        }
        open
    }
}

/// All scene textures, indexed by [`TextureSlot`].
#[derive(Debug)]
pub struct TextureSet {
    slots: [Option<Texture>; TextureSlot::COUNT],
    gate: LoadGate,
}

impl TextureSet {
    /// Size of generated textures.
    pub const PROCEDURAL_SIZE: u32 = 128;

    /// Loads every slot from `dir`, or generates them when `procedural` is set.
    /// Failures are logged and leave the slot empty.
    pub fn load(gpu: &GpuContext, dir: &Path, procedural: bool) -> Self {
        let mut slots: [Option<Texture>; TextureSlot::COUNT] = Default::default();
        let mut gate = LoadGate::default();

        for slot in TextureSlot::ALL {
            let texture = if procedural {
                let image = slot.procedural(Self::PROCEDURAL_SIZE);
                Ok(Texture::from_image(gpu, &image, slot.file_name()))
            } else {
                Texture::from_file(gpu, &dir.join(slot.file_name()))
            };
            match texture {
                Ok(texture) => {
                    slots[slot.index()] = Some(texture);
                    gate.mark_loaded(slot);
                }
                Err(e) => log::error!("{e}"),
            }
        }

        log::info!(
            "{}/{} textures {}",
            gate.loaded(),
            LoadGate::REQUIRED,
            if procedural { "generated" } else { "loaded" }
        );
        Self { slots, gate }
    }

    pub fn get(&self, slot: TextureSlot) -> Option<&Texture> {
        self.slots[slot.index()].as_ref()
    }

    pub fn ready(&mut self) -> bool {
        self.gate.poll()
    }
}

/// Simple hash function for procedural generation.
fn hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_add(x.wrapping_mul(374761393));
    h = h.wrapping_add(y.wrapping_mul(668265263));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    h
}

fn shade(base: [u8; 3], delta: i32) -> image::Rgba<u8> {
    let c = |v: u8| (v as i32 + delta).clamp(0, 255) as u8;
    image::Rgba([c(base[0]), c(base[1]), c(base[2]), 255])
}

/// Horizontal boards with staggered joints.
fn planks(size: u32, seed: u32, base: [u8; 3], rows: u32) -> RgbaImage {
    let plank = (size / rows).max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        let row = y / plank;
        let tone = (hash(row, 0, seed) % 30) as i32 - 15;
        let stagger = hash(row, 1, seed) % size;
        let seam = y % plank == 0 || (x + stagger) % size == 0;
        let streak = ((hash(x / 6, y, seed) % 12) as i32) - 6;
        shade(base, tone + streak - if seam { 45 } else { 0 })
    })
}

/// Fine vertical grain.
fn grain(size: u32, seed: u32, base: [u8; 3]) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        let line = (hash(x, 0, seed) % 24) as i32 - 12;
        let fleck = (hash(x, y / 4, seed) % 8) as i32 - 4;
        shade(base, line + fleck)
    })
}

/// Near-white surface with a grey frame.
fn whiteboard(size: u32, seed: u32) -> RgbaImage {
    let border = (size / 32).max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        let edge = x < border || y < border || x >= size - border || y >= size - border;
        if edge {
            shade([150, 150, 155], 0)
        } else {
            shade([246, 246, 248], (hash(x, y, seed) % 6) as i32 - 3)
        }
    })
}

/// Wood with a recessed rectangular panel.
fn panelled(size: u32, seed: u32, base: [u8; 3]) -> RgbaImage {
    let wood = grain(size, seed, base);
    let inset = size / 6;
    RgbaImage::from_fn(size, size, |x, y| {
        let inside = x > inset && x < size - inset && y > inset && y < size - inset;
        let outline = inside
            && (x == inset + 1 || y == inset + 1 || x == size - inset - 1 || y == size - inset - 1);
        let px = *wood.get_pixel(x, y);
        let darken = if outline { -40 } else if inside { -12 } else { 0 };
        shade([px[0], px[1], px[2]], darken)
    })
}

/// Random pick from a palette per pixel.
fn speckle(size: u32, seed: u32, palette: &[[u8; 3]]) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        let base = palette[(hash(x, y, seed) % palette.len() as u32) as usize];
        shade(base, (hash(x + 500, y + 500, seed) % 10) as i32 - 5)
    })
}

/// Checked over/under weave.
fn weave(size: u32, seed: u32, base: [u8; 3]) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        let over = ((x / 2) + (y / 2)) % 2 == 0;
        let noise = (hash(x, y, seed) % 10) as i32 - 5;
        shade(base, noise + if over { 14 } else { -14 })
    })
}
