//! Surface actors: a mesh with the colour and opacity it is drawn with

use crate::{
    geometry::{Bounds, SurfaceMesh},
    gfx::resources::{MaterialLayouts, MaterialUniform, SurfaceBuffers},
    io::NamedSurface,
};

use super::palette::{palette_color, NamedColor};

pub struct SurfaceActor {
    name: String,
    color: NamedColor,
    opacity: f32,
    mesh: SurfaceMesh,
    material_dirty: bool,
    gpu: Option<SurfaceBuffers>,
}

impl SurfaceActor {
    pub fn new(
        name: impl Into<String>,
        mesh: SurfaceMesh,
        color: NamedColor,
        opacity: f32,
    ) -> Self {
        Self {
            name: name.into(),
            color,
            opacity: opacity.clamp(0.0, 1.0),
            mesh,
            material_dirty: true,
            gpu: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> NamedColor {
        self.color
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Sets the opacity, clamped to `[0, 1]`. Returns whether it changed.
    pub fn set_opacity(&mut self, opacity: f32) -> bool {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity == self.opacity {
            return false;
        }
        self.opacity = opacity;
        self.material_dirty = true;
        true
    }

    pub fn is_translucent(&self) -> bool {
        self.opacity < 1.0
    }

    pub fn mesh(&self) -> &SurfaceMesh {
        &self.mesh
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.mesh.bounds()
    }

    fn material(&self) -> MaterialUniform {
        MaterialUniform::new(self.color.to_f32(), self.opacity)
    }

    pub fn gpu(&self) -> Option<&SurfaceBuffers> {
        self.gpu.as_ref()
    }

    /// Uploads the mesh. Actors with an empty mesh stay without GPU buffers
    /// and are never drawn.
    pub fn init_gpu_resources(&mut self, device: &wgpu::Device, layouts: &MaterialLayouts) {
        self.gpu = SurfaceBuffers::new(device, layouts, &self.mesh, self.material(), &self.name);
        if self.gpu.is_none() {
            log::warn!("{} has no triangles, it will not be drawn", self.name);
        }
        self.material_dirty = false;
    }

    pub fn sync_gpu(&mut self, queue: &wgpu::Queue) {
        if !self.material_dirty {
            return;
        }
        let material = self.material();
        if let Some(gpu) = &mut self.gpu {
            gpu.update_material(queue, material);
        }
        self.material_dirty = false;
    }
}

/// One actor per surface, in order, coloured from the palette by position.
pub fn build_actors(surfaces: Vec<NamedSurface>, opacity: f32) -> Vec<SurfaceActor> {
    surfaces
        .into_iter()
        .enumerate()
        .map(|(i, surface)| {
            SurfaceActor::new(surface.name, surface.mesh, palette_color(i), opacity)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::palette::{BANANA, PALETTE, TOMATO};

    fn surface(name: &str) -> NamedSurface {
        NamedSurface {
            name: name.to_string(),
            mesh: SurfaceMesh::new(
                vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                None,
                vec![0, 1, 2],
            ),
        }
    }

    #[test]
    fn test_colors_follow_position() {
        let surfaces = (0..12).map(|i| surface(&format!("m{i:02}.vtk"))).collect();
        let actors = build_actors(surfaces, 0.8);
        assert_eq!(actors.len(), 12);
        assert_eq!(actors[0].color(), TOMATO);
        assert_eq!(actors[1].color(), BANANA);
        assert_eq!(actors[10].color(), PALETTE[0]);
        assert_eq!(actors[11].color(), PALETTE[1]);
        assert_eq!(actors[3].name(), "m03.vtk");
    }

    #[test]
    fn test_initial_opacity() {
        let actors = build_actors(vec![surface("a.vtk")], 0.8);
        assert_eq!(actors[0].opacity(), 0.8);
        assert!(actors[0].is_translucent());
    }

    #[test]
    fn test_set_opacity_clamps_and_reports_change() {
        let mut actor = build_actors(vec![surface("a.vtk")], 0.8).remove(0);
        assert!(!actor.set_opacity(0.8));
        assert!(actor.set_opacity(1.5));
        assert_eq!(actor.opacity(), 1.0);
        assert!(!actor.is_translucent());
        assert!(actor.set_opacity(0.3));
        assert_eq!(actor.opacity(), 0.3);
    }
}
