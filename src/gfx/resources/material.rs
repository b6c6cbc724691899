//! Per-draw material bindings
//!
//! Surfaces bind a flat colour uniform at slot 1; slice planes bind their
//! texture and sampler at the same slot.

use wgpu::Device;

use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

use super::texture_resource::TextureResource;

/// GPU uniform data for a surface: RGB plus opacity in alpha
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
}

impl MaterialUniform {
    pub fn new(rgb: [f32; 3], opacity: f32) -> Self {
        Self {
            color: [rgb[0], rgb[1], rgb[2], opacity],
        }
    }
}

pub type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Bind group layouts shared by every surface and every slice plane
pub struct MaterialLayouts {
    surface: BindGroupLayoutWithDesc,
    slice: BindGroupLayoutWithDesc,
}

impl MaterialLayouts {
    pub fn new(device: &Device) -> Self {
        let surface = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .create(device, "Surface Material Bind Group");
        let slice = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(
                wgpu::SamplerBindingType::Filtering,
            ))
            .create(device, "Slice Bind Group");

        Self { surface, slice }
    }

    pub fn surface_layout(&self) -> &wgpu::BindGroupLayout {
        &self.surface.layout
    }

    pub fn slice_layout(&self) -> &wgpu::BindGroupLayout {
        &self.slice.layout
    }

    pub fn surface_bind_group(
        &self,
        device: &Device,
        ubo: &MaterialUBO,
        label: &str,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(&self.surface)
            .resource(ubo.binding_resource())
            .create(device, label)
    }

    pub fn slice_bind_group(
        &self,
        device: &Device,
        texture: &TextureResource,
        label: &str,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(&self.slice)
            .texture(&texture.view)
            .sampler(&texture.sampler)
            .create(device, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_uniform_layout() {
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 16);
        let m = MaterialUniform::new([1.0, 0.5, 0.25], 0.8);
        assert_eq!(m.color, [1.0, 0.5, 0.25, 0.8]);
    }
}
