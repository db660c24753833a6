//! Primitive meshes and their GPU upload.
//!
//! The whole classroom is built from two primitives:
//!
//! - [`Primitive::Cube`]: a unit cube centered at the origin, 24 vertices (four per
//!   face, so each face carries its own normal and UVs) and 36 indices.
//! - [`Primitive::Plane`]: a unit square in the XY plane facing `-Z`, 4 vertices and
//!   6 indices. Used for translucent panes and light diffusers.
//!
//! Geometry is produced on the CPU as [`MeshData`] (separate attribute arrays, so it
//! can be validated and tested without a device) and interleaved into [`Vertex3d`]
//! when uploaded.
//!
//! # Vertex Layout
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//! | uv        | Float32x2 | 24     | 2               |
//! | color     | Float32x4 | 32     | 3               |

use crate::color::Color;
use crate::error::MeshError;
use crate::gpu::GpuContext;

/// A vertex with position, normal, texture coordinates and a per-vertex color.
///
/// 48 bytes, `#[repr(C)]` so it can be cast straight into a vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex3d {
    /// The wgpu vertex buffer layout for this vertex type.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
            // color
            wgpu::VertexAttribute {
                offset: 32,
                shader_location: 3,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    };
}

/// The two shapes every object in the scene is assembled from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Cube,
    Plane,
}

impl Primitive {
    /// CPU-side geometry for this primitive with every vertex set to `color`.
    pub fn mesh_data(self, color: Color) -> MeshData {
        match self {
            Primitive::Cube => MeshData::cube(color),
            Primitive::Plane => MeshData::plane(color),
        }
    }
}

/// CPU-side geometry: parallel attribute arrays plus a triangle index list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub colors: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Unit cube centered at the origin, spanning `-0.5..=0.5` on each axis.
    ///
    /// Each face maps the full `[0, 1]` UV range. Winding is counter-clockwise when
    /// viewed from outside.
    pub fn cube(color: Color) -> Self {
        #[rustfmt::skip]
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            // front (Z+)
            ([ 0.0,  0.0,  1.0], [[-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5]]),
            // back (Z-)
            ([ 0.0,  0.0, -1.0], [[ 0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5]]),
            // top (Y+)
            ([ 0.0,  1.0,  0.0], [[-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5]]),
            // bottom (Y-)
            ([ 0.0, -1.0,  0.0], [[-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5]]),
            // right (X+)
            ([ 1.0,  0.0,  0.0], [[ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5]]),
            // left (X-)
            ([-1.0,  0.0,  0.0], [[-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5]]),
        ];
        const FACE_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

        let mut data = Self::with_capacity(24, 36);
        for (normal, corners) in faces {
            let base = data.positions.len() as u32;
            for (corner, uv) in corners.into_iter().zip(FACE_UVS) {
                data.push_vertex(corner, normal, uv, color);
            }
            data.indices
                .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        data
    }

    /// Unit square in the XY plane centered at the origin, normal `-Z`.
    pub fn plane(color: Color) -> Self {
        let normal = [0.0, 0.0, -1.0];
        let mut data = Self::with_capacity(4, 6);
        data.push_vertex([0.5, 0.5, 0.0], normal, [1.0, 0.0], color);
        data.push_vertex([-0.5, 0.5, 0.0], normal, [0.0, 0.0], color);
        data.push_vertex([-0.5, -0.5, 0.0], normal, [0.0, 1.0], color);
        data.push_vertex([0.5, -0.5, 0.0], normal, [1.0, 1.0], color);
        data.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
        data
    }

    fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            uvs: Vec::with_capacity(vertices),
            colors: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3], uv: [f32; 2], color: Color) {
        self.positions.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        self.colors.push(color.to_array());
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Checks attribute lengths agree and every index names an existing vertex.
    pub fn validate(&self) -> Result<(), MeshError> {
        let vertex_count = self.positions.len();
        if vertex_count == 0 || self.indices.is_empty() {
            return Err(MeshError::Empty);
        }
        for (attribute, found) in [
            ("normal", self.normals.len()),
            ("uv", self.uvs.len()),
            ("color", self.colors.len()),
        ] {
            if found != vertex_count {
                return Err(MeshError::AttributeLength {
                    attribute,
                    expected: vertex_count,
                    found,
                });
            }
        }
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::IncompleteTriangle(self.indices.len()));
        }
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
        Ok(())
    }

    /// Interleaves the attribute arrays into GPU vertices.
    pub fn interleave(&self) -> Vec<Vertex3d> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .zip(&self.colors)
            .map(|(((&position, &normal), &uv), &color)| Vertex3d {
                position,
                normal,
                uv,
                color,
            })
            .collect()
    }
}

/// GPU-resident geometry with vertex and index buffers.
#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

impl Mesh {
    /// Validates `data` and uploads it.
    ///
    /// Fails without touching the device if the data is malformed or either buffer
    /// would exceed the device's maximum buffer size.
    pub fn upload(gpu: &GpuContext, data: &MeshData) -> Result<Self, MeshError> {
        use wgpu::util::DeviceExt;

        data.validate()?;
        let vertices = data.interleave();
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(&data.indices);

        let limit = gpu.device.limits().max_buffer_size;
        for size in [vertex_bytes.len() as u64, index_bytes.len() as u64] {
            if size > limit {
                return Err(MeshError::BufferTooLarge { size, limit });
            }
        }

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: vertex_bytes,
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: index_bytes,
                usage: wgpu::BufferUsages::INDEX,
            });

        Ok(Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn cube_has_four_vertices_per_face() {
        let cube = MeshData::cube(Color::WHITE);
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert_eq!(cube.validate(), Ok(()));
    }

    #[test]
    fn plane_is_a_single_quad() {
        let plane = MeshData::plane(Color::BLACK);
        assert_eq!(plane.vertex_count(), 4);
        assert_eq!(plane.indices.len(), 6);
        assert!(plane.normals.iter().all(|n| *n == [0.0, 0.0, -1.0]));
        assert!(plane.positions.iter().all(|p| p[2] == 0.0));
    }

    #[test]
    fn every_vertex_carries_the_requested_color() {
        let color = Color::rgba(0.2, 0.4, 0.6, 0.25);
        let cube = Primitive::Cube.mesh_data(color);
        assert!(cube.colors.iter().all(|c| *c == color.to_array()));
    }

    #[test]
    fn cube_faces_wind_outward() {
        let cube = MeshData::cube(Color::WHITE);
        for tri in cube.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(cube.positions[i as usize]));
            let face_normal = (b - a).cross(c - a).normalize();
            let stored = Vec3::from(cube.normals[tri[0] as usize]);
            assert!(face_normal.dot(stored) > 0.99);
        }
    }

    #[test]
    fn validate_rejects_short_attribute() {
        let mut cube = MeshData::cube(Color::WHITE);
        cube.uvs.pop();
        assert_eq!(
            cube.validate(),
            Err(MeshError::AttributeLength {
                attribute: "uv",
                expected: 24,
                found: 23
            })
        );
    }

    #[test]
    fn validate_rejects_dangling_index() {
        let mut plane = MeshData::plane(Color::WHITE);
        plane.indices[4] = 9;
        assert_eq!(
            plane.validate(),
            Err(MeshError::IndexOutOfRange {
                index: 9,
                vertex_count: 4
            })
        );
    }

    #[test]
    fn validate_rejects_empty_and_partial_triangles() {
        assert_eq!(MeshData::default().validate(), Err(MeshError::Empty));
        let mut plane = MeshData::plane(Color::WHITE);
        plane.indices.pop();
        assert_eq!(plane.validate(), Err(MeshError::IncompleteTriangle(5)));
    }

    #[test]
    fn interleave_preserves_attributes() {
        let plane = MeshData::plane(Color::WHITE);
        let vertices = plane.interleave();
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[2].position, [-0.5, -0.5, 0.0]);
        assert_eq!(vertices[2].color, [1.0; 4]);
        assert_eq!(std::mem::size_of::<Vertex3d>(), 48);
    }
}
