//! WGPU-based scene renderer
//!
//! Draws the viewer scene into its window: opaque surfaces first, then the
//! slice planes, then translucent surfaces sorted back to front with depth
//! writes disabled.

use std::sync::Arc;

use cgmath::{InnerSpace, Vector3};
use wgpu::TextureFormat;

use crate::{
    error::{Error, Result},
    gfx::{
        camera::camera_utils::CameraUniform,
        resources::{
            global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO},
            material::MaterialLayouts,
            texture_resource::DepthTexture,
        },
    },
    scene::{SurfaceActor, ViewerScene},
};

use super::{
    pipeline_manager::{PipelineConfig, PipelineManager},
    render_pass_ext::DrawSceneExt,
    vertex::{SliceVertex, SurfaceVertex},
    window_surface::WindowSurface,
};

const SURFACE_OPAQUE: &str = "SurfaceOpaque";
const SURFACE_TRANSLUCENT: &str = "SurfaceTranslucent";
const SLICE: &str = "Slice";

pub struct RenderEngine {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    depth_texture: DepthTexture,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    material_layouts: MaterialLayouts,
}

impl RenderEngine {
    /// Builds the pipelines for drawing into surfaces of `format`.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let depth_texture = DepthTexture::new(&device, width, height, "depth_texture");

        let global_ubo = GlobalUBO::new(&device, &CameraUniform::default());
        let global_bindings = GlobalBindings::new(&device, &global_ubo);
        let material_layouts = MaterialLayouts::new(&device);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        pipeline_manager.load_shader("surface", include_str!("shaders/surface.wgsl"));
        pipeline_manager.load_shader("slice", include_str!("shaders/slice.wgsl"));

        let opaque_target = Some(wgpu::ColorTargetState {
            format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        });
        let blended_target = Some(wgpu::ColorTargetState {
            format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        });

        let surface_config = PipelineConfig::default_with_shader("surface")
            .with_bind_group_layouts(vec![
                global_bindings.bind_group_layout().clone(),
                material_layouts.surface_layout().clone(),
            ])
            .with_vertex_layouts(vec![SurfaceVertex::desc()])
            .with_cull_mode(None)
            .with_depth_stencil(DepthTexture::FORMAT);

        pipeline_manager.register_pipeline(
            SURFACE_OPAQUE,
            surface_config
                .clone()
                .with_label("Opaque Surface Pipeline")
                .with_color_targets(vec![opaque_target.clone()]),
        );
        pipeline_manager.register_pipeline(
            SURFACE_TRANSLUCENT,
            surface_config
                .with_label("Translucent Surface Pipeline")
                .with_color_targets(vec![blended_target])
                .without_depth_write(),
        );
        pipeline_manager.register_pipeline(
            SLICE,
            PipelineConfig::default_with_shader("slice")
                .with_label("Slice Pipeline")
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    material_layouts.slice_layout().clone(),
                ])
                .with_vertex_layouts(vec![SliceVertex::desc()])
                .with_cull_mode(None)
                .with_depth_stencil(DepthTexture::FORMAT)
                .with_color_targets(vec![opaque_target]),
        );

        pipeline_manager
            .create_all_pipelines()
            .map_err(|errors| Error::Gpu(errors.join("; ")))?;
        log::debug!("{:?}", pipeline_manager.get_stats());

        Ok(Self {
            device,
            queue,
            depth_texture,
            pipeline_manager,
            global_ubo,
            global_bindings,
            material_layouts,
        })
    }

    pub fn material_layouts(&self) -> &MaterialLayouts {
        &self.material_layouts
    }

    /// Updates camera uniform buffer
    pub fn update(&mut self, camera_uniform: CameraUniform) {
        update_global_ubo(&mut self.global_ubo, &self.queue, camera_uniform);
    }

    /// Recreates the depth buffer for a new surface size
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.depth_texture = DepthTexture::new(&self.device, width, height, "depth_texture");
    }

    /// Uploads pending scene changes and draws one frame into `target`.
    pub fn render_frame(
        &mut self,
        target: &mut WindowSurface,
        scene: &mut ViewerScene,
    ) -> Result<()> {
        scene.sync_gpu(&self.queue);
        self.update(scene.camera_manager.camera.uniform);

        let Some(frame) = target.acquire()? else {
            return Ok(());
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (opaque, translucent) = partition_actors(&scene.actors);
        let eye = scene.camera_manager.camera.eye;
        let translucent = sort_back_to_front(translucent, eye);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(scene.background().to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(SURFACE_OPAQUE) {
                render_pass.set_pipeline(pipeline);
                for gpu in opaque.iter().filter_map(|actor| actor.gpu()) {
                    render_pass.draw_surface(gpu);
                }
            }

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(SLICE) {
                render_pass.set_pipeline(pipeline);
                for plane in scene.planes().iter().filter(|p| p.is_visible()) {
                    if let Some(gpu) = plane.gpu() {
                        render_pass.draw_slice(gpu);
                    }
                }
            }

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(SURFACE_TRANSLUCENT) {
                render_pass.set_pipeline(pipeline);
                for gpu in translucent.iter().filter_map(|actor| actor.gpu()) {
                    render_pass.draw_surface(gpu);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

/// Splits actors into fully opaque and translucent, preserving order.
/// Fully transparent actors are dropped.
fn partition_actors(actors: &[SurfaceActor]) -> (Vec<&SurfaceActor>, Vec<&SurfaceActor>) {
    actors
        .iter()
        .filter(|actor| actor.opacity() > 0.0)
        .partition(|actor| !actor.is_translucent())
}

/// Orders actors farthest first by the distance from `eye` to their bounds center.
fn sort_back_to_front(mut actors: Vec<&SurfaceActor>, eye: Vector3<f32>) -> Vec<&SurfaceActor> {
    let distance = |actor: &SurfaceActor| {
        actor
            .bounds()
            .map(|b| (b.center() - eye).magnitude2())
            .unwrap_or(0.0)
    };
    actors.sort_by(|a, b| distance(*b).total_cmp(&distance(*a)));
    actors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geometry::SurfaceMesh, io::NamedSurface, scene::build_actors};

    fn surface_at(name: &str, x: f32) -> NamedSurface {
        NamedSurface {
            name: name.to_string(),
            mesh: SurfaceMesh::new(
                vec![[x, 0.0, 0.0], [x + 1.0, 0.0, 0.0], [x, 1.0, 0.0]],
                None,
                vec![0, 1, 2],
            ),
        }
    }

    #[test]
    fn test_partition_by_opacity() {
        let mut actors = build_actors(
            vec![surface_at("a", 0.0), surface_at("b", 1.0), surface_at("c", 2.0)],
            0.8,
        );
        actors[1].set_opacity(1.0);
        actors[2].set_opacity(0.0);
        let (opaque, translucent) = partition_actors(&actors);
        assert_eq!(opaque.iter().map(|a| a.name()).collect::<Vec<_>>(), ["b"]);
        assert_eq!(translucent.iter().map(|a| a.name()).collect::<Vec<_>>(), ["a"]);
    }

    #[test]
    fn test_translucent_sorted_far_to_near() {
        let actors = build_actors(
            vec![surface_at("near", 1.0), surface_at("far", 50.0), surface_at("mid", 20.0)],
            0.5,
        );
        let sorted = sort_back_to_front(actors.iter().collect(), Vector3::new(0.0, 0.0, 0.0));
        let names: Vec<_> = sorted.iter().map(|a| a.name()).collect();
        assert_eq!(names, ["far", "mid", "near"]);
    }
}
