use wgpu::util::DeviceExt;

use crate::gfx::rendering::vertex::SurfaceVertex;
use crate::geometry::SurfaceMesh;

use super::material::{MaterialLayouts, MaterialUBO, MaterialUniform};

/// Everything the GPU needs to draw one surface mesh
pub struct SurfaceBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    material: MaterialUBO,
    pub bind_group: wgpu::BindGroup,
}

impl SurfaceBuffers {
    /// Uploads `mesh`. Returns `None` for a mesh without triangles, which has
    /// nothing to draw and cannot back a zero-sized buffer slice.
    pub fn new(
        device: &wgpu::Device,
        layouts: &MaterialLayouts,
        mesh: &SurfaceMesh,
        material: MaterialUniform,
        label: &str,
    ) -> Option<Self> {
        if mesh.is_empty() {
            return None;
        }

        let vertices = SurfaceVertex::from_mesh(mesh);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let material = MaterialUBO::new(device, &material);
        let bind_group =
            layouts.surface_bind_group(device, &material, &format!("{label} Material"));

        Some(Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            material,
            bind_group,
        })
    }

    pub fn update_material(&mut self, queue: &wgpu::Queue, material: MaterialUniform) {
        self.material.update_content(queue, material);
    }
}
