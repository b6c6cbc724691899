use wgpu::util::DeviceExt;

use crate::gfx::rendering::vertex::{SliceVertex, QUAD_INDICES};

use super::{material::MaterialLayouts, texture_resource::TextureResource};

/// Texture and quad for one slice plane
///
/// The texture keeps the size it was created with; the quad is rewritten in
/// place whenever the plane moves.
pub struct SliceBuffers {
    pub texture: TextureResource,
    pub bind_group: wgpu::BindGroup,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
}

impl SliceBuffers {
    pub fn new(
        device: &wgpu::Device,
        layouts: &MaterialLayouts,
        width: u32,
        height: u32,
        quad: &[SliceVertex; 4],
        label: &str,
    ) -> Self {
        let texture = TextureResource::create_slice_texture(device, width, height, label);
        let bind_group = layouts.slice_bind_group(device, &texture, &format!("{label} Bind Group"));

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(quad),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            texture,
            bind_group,
            vertex_buffer,
            index_buffer,
        }
    }

    /// Replaces the slice image. `rgba` must cover the whole texture.
    pub fn write_image(&self, queue: &wgpu::Queue, rgba: &[u8], width: u32, height: u32) {
        if width != self.texture.width() || height != self.texture.height() {
            log::warn!(
                "slice image {}x{} does not match texture {}x{}, skipping upload",
                width,
                height,
                self.texture.width(),
                self.texture.height()
            );
            return;
        }
        self.texture.write_rgba(queue, rgba, width, height);
    }

    pub fn write_quad(&self, queue: &wgpu::Queue, quad: &[SliceVertex; 4]) {
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(quad));
    }

    pub fn index_count(&self) -> u32 {
        QUAD_INDICES.len() as u32
    }
}
