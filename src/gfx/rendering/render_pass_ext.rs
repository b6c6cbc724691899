//! Render pass extensions for scene geometry

use wgpu::*;

use crate::gfx::resources::{SliceBuffers, SurfaceBuffers};

/// Slot the per-draw material or slice bind group is bound to
pub const MATERIAL_SLOT: u32 = 1;

/// Extension trait for RenderPass to draw uploaded scene geometry
pub trait DrawSceneExt {
    fn draw_surface(&mut self, surface: &SurfaceBuffers);
    fn draw_slice(&mut self, slice: &SliceBuffers);
}

impl DrawSceneExt for RenderPass<'_> {
    fn draw_surface(&mut self, surface: &SurfaceBuffers) {
        self.set_bind_group(MATERIAL_SLOT, &surface.bind_group, &[]);
        self.set_vertex_buffer(0, surface.vertex_buffer.slice(..));
        self.set_index_buffer(surface.index_buffer.slice(..), IndexFormat::Uint32);
        self.draw_indexed(0..surface.index_count, 0, 0..1);
    }

    fn draw_slice(&mut self, slice: &SliceBuffers) {
        self.set_bind_group(MATERIAL_SLOT, &slice.bind_group, &[]);
        self.set_vertex_buffer(0, slice.vertex_buffer.slice(..));
        self.set_index_buffer(slice.index_buffer.slice(..), IndexFormat::Uint16);
        self.draw_indexed(0..slice.index_count(), 0, 0..1);
    }
}
