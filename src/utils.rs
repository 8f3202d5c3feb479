use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use bytemuck::{Pod, Zeroable};

/// Rounds `value` to the nearest multiple of `step`. Halfway values round up.
pub fn round_to(value: f32, step: f32) -> f32 {
    (value / step + 0.5).floor() * step
}

/// Snaps every component of `point` onto a lattice of spacing `step`.
pub fn snap_to_lattice(point: Vec3, step: f32) -> Vec3 {
    Vec3::new(round_to(point.x, step), round_to(point.y, step), round_to(point.z, step))
}

pub fn world_distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

/// Distance between two points as seen on screen: both go through the view
/// transform and the depth axis is dropped.
pub fn apparent_distance(a: Vec3, b: Vec3, view: &Mat4) -> f32 {
    let a = view.transform_point3(a);
    let b = view.transform_point3(b);
    a.truncate().distance(b.truncate())
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub color: [f32; 4],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Appends an axis-aligned box as 12 triangles.
    pub fn push_box(&mut self, min: Vec3, max: Vec3, color: [f32; 4]) {
        let base = self.vertices.len() as u32;
        for corner in box_corners(min, max) {
            self.vertices.push(Vertex { pos: corner.to_array(), color });
        }
        self.indices.extend(BOX_TRIANGLES.iter().map(|i| base + i));
    }

    /// Applies `transform` to every vertex position.
    pub fn transform(&mut self, transform: &Mat4) {
        for v in self.vertices.iter_mut() {
            v.pos = transform.transform_point3(Vec3::from(v.pos)).to_array();
        }
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertices = bytemuck::cast_slice(&self.vertices);
        let indices = bytemuck::cast_slice(&self.indices);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// Corners in the same order as [`BOX_TRIANGLES`] expects.
fn box_corners(min: Vec3, max: Vec3) -> [Vec3; 8] {
    [
        Vec3::new(min.x, max.y, max.z),
        Vec3::new(max.x, max.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(max.x, min.y, min.z),
    ]
}

pub const BOX_TRIANGLES: [u32; 36] = [
    0, 3, 1, 1, 3, 2, // front
    5, 0, 6, 6, 0, 1, // top
    1, 2, 6, 6, 2, 7, // right
    5, 4, 0, 0, 4, 3, // left
    3, 4, 2, 2, 4, 7, // bottom
    6, 7, 5, 5, 7, 4, // back
];
