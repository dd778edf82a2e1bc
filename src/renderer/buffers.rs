use glam::Vec3;

use crate::math::mesh::TriangleMesh;

/// Position and normal streams of one surface.
pub struct VertexBuffers {
    pub positions: wgpu::Buffer,
    pub normals: wgpu::Buffer,
    pub vertex_count: u32,
}

impl VertexBuffers {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, mesh: &TriangleMesh, label: &str) -> Self {
        let positions = vertex_buffer(device, &format!("{} Positions", label), mesh.vertices.len());
        let normals = vertex_buffer(device, &format!("{} Normals", label), mesh.normals.len());

        queue.write_buffer(&positions, 0, bytemuck::cast_slice(&mesh.vertices));
        queue.write_buffer(&normals, 0, bytemuck::cast_slice(&mesh.normals));

        Self {
            positions,
            normals,
            vertex_count: mesh.vertex_count() as u32,
        }
    }
}

/// A surface with its own index buffer.
pub struct MeshBuffers {
    pub vertices: VertexBuffers,
    pub indices: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffers {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, mesh: &TriangleMesh, label: &str) -> Self {
        let indices = index_buffer(device, &format!("{} Indices", label), mesh.indices.len());
        queue.write_buffer(&indices, 0, bytemuck::cast_slice(&mesh.indices));

        Self {
            vertices: VertexBuffers::upload(device, queue, mesh, label),
            indices,
            index_count: mesh.indices.len() as u32,
        }
    }
}

/// GPU copies of the land surface and every water stage.
///
/// All surfaces share the land topology, so there is one index buffer and
/// one vertex/normal pair per stage. Switching stage picks a different entry.
pub struct StageBufferPool {
    pub indices: wgpu::Buffer,
    pub index_count: u32,
    pub land: VertexBuffers,
    stages: Vec<VertexBuffers>,
    generation: u64,
}

impl StageBufferPool {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        land: &TriangleMesh,
        water: &[TriangleMesh],
        generation: u64,
    ) -> Self {
        let indices = index_buffer(device, "Terrain Indices", land.indices.len());
        queue.write_buffer(&indices, 0, bytemuck::cast_slice(&land.indices));

        let stages = water
            .iter()
            .enumerate()
            .map(|(i, mesh)| VertexBuffers::upload(device, queue, mesh, &format!("Water Stage {}", i)))
            .collect::<Vec<_>>();

        log::debug!("uploaded {} water stages to the GPU", stages.len());

        Self {
            indices,
            index_count: land.indices.len() as u32,
            land: VertexBuffers::upload(device, queue, land, "Land"),
            stages,
            generation,
        }
    }

    pub fn stage(&self, stage: usize) -> Option<&VertexBuffers> {
        self.stages.get(stage)
    }

    /// Plot generation these buffers were uploaded from.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Line-list geometry for the axes cube.
pub struct LineBuffer {
    pub buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl LineBuffer {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, lines: &[Vec3]) -> Self {
        let flat: Vec<f32> = lines.iter().flat_map(|p| p.to_array()).collect();
        let buffer = vertex_buffer(device, "Axes Lines", flat.len());
        queue.write_buffer(&buffer, 0, bytemuck::cast_slice(&flat));

        Self {
            buffer,
            vertex_count: lines.len() as u32,
        }
    }
}

fn vertex_buffer(device: &wgpu::Device, label: &str, floats: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: buffer_size(floats * 4),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn index_buffer(device: &wgpu::Device, label: &str, indices: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: buffer_size(indices * 4),
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Rounds up to the copy alignment; zero-sized buffers get one aligned block.
fn buffer_size(bytes: usize) -> u64 {
    let align = wgpu::COPY_BUFFER_ALIGNMENT;
    (bytes as u64).div_ceil(align).max(1) * align
}

pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}

pub fn normal_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}
