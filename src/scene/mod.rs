//! # Scene Module
//!
//! The state both windows work on: the volume, its three cross-section planes,
//! the surface actors, and the camera looking at them.
//!
//! [`ViewerScene`] is handed to the scene window for drawing and keyboard
//! handling and to the opacity panel for editing actor opacity.

pub mod actor;
pub mod keymap;
pub mod palette;
pub mod slice_plane;

use winit::keyboard::Key;

use crate::{
    geometry::Bounds,
    gfx::{camera::CameraManager, resources::MaterialLayouts},
    volume::{window_level::WindowLevel, Volume},
};

pub use actor::{build_actors, SurfaceActor};
pub use keymap::{command_for_key, SliceCommand};
pub use palette::{NamedColor, BACKGROUND, PALETTE};
pub use slice_plane::{Orientation, SlicePlane, StepPolicy};

pub struct ViewerScene {
    volume: Volume,
    pub actors: Vec<SurfaceActor>,
    planes: [SlicePlane; 3],
    pub camera_manager: CameraManager,
    background: NamedColor,
}

impl ViewerScene {
    /// Composes the scene with the three planes at the volume midpoints.
    pub fn new(
        volume: Volume,
        actors: Vec<SurfaceActor>,
        window_level: WindowLevel,
        policy: StepPolicy,
    ) -> Self {
        log::info!("Slice stepping is {policy}");
        let extent = volume.extent();
        let planes = Orientation::ALL
            .map(|orientation| SlicePlane::new(orientation, extent, window_level, policy));
        for plane in &planes {
            log::debug!(
                "{} plane at {}",
                plane.orientation().name(),
                plane.slice_index()
            );
        }

        Self {
            volume,
            actors,
            planes,
            camera_manager: CameraManager::default(),
            background: BACKGROUND,
        }
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn planes(&self) -> &[SlicePlane; 3] {
        &self.planes
    }

    pub fn plane(&self, orientation: Orientation) -> &SlicePlane {
        &self.planes[Self::plane_index(orientation)]
    }

    fn plane_index(orientation: Orientation) -> usize {
        match orientation {
            Orientation::Sagittal => 0,
            Orientation::Coronal => 1,
            Orientation::Axial => 2,
        }
    }

    pub fn background(&self) -> NamedColor {
        self.background
    }

    /// Bounds of the volume together with every non-empty surface
    pub fn bounds(&self) -> Bounds {
        self.actors
            .iter()
            .filter_map(SurfaceActor::bounds)
            .fold(self.volume.world_bounds(), |acc, b| acc.union(&b))
    }

    /// Handles a key press. Returns true if the key is bound, whether or not
    /// the plane could move.
    pub fn apply_key(&mut self, key: &Key) -> bool {
        match command_for_key(key) {
            Some(command) => {
                self.apply_command(command);
                true
            }
            None => false,
        }
    }

    /// Steps the plane named by `command`. Returns whether it moved.
    pub fn apply_command(&mut self, command: SliceCommand) -> bool {
        self.planes[Self::plane_index(command.orientation)].step(command.delta)
    }

    /// Points the camera at the whole scene. Done once at startup.
    pub fn frame_camera(&mut self, width: u32, height: u32) {
        let bounds = self.bounds();
        let camera = &mut self.camera_manager.camera;
        camera.resize_projection(width, height);
        camera.frame_bounds(&bounds);
        log::debug!(
            "camera framed at distance {:.1} around ({:.1}, {:.1}, {:.1})",
            camera.distance,
            camera.target.x,
            camera.target.y,
            camera.target.z
        );
    }

    pub fn init_gpu_resources(
        &mut self,
        device: &wgpu::Device,
        layouts: &MaterialLayouts,
        max_texture_dimension: u32,
    ) {
        for actor in &mut self.actors {
            actor.init_gpu_resources(device, layouts);
        }
        for plane in &mut self.planes {
            plane.init_gpu_resources(device, layouts, &self.volume, max_texture_dimension);
        }
    }

    /// Pushes changed slabs and opacities to the GPU.
    pub fn sync_gpu(&mut self, queue: &wgpu::Queue) {
        for actor in &mut self.actors {
            actor.sync_gpu(queue);
        }
        for plane in &mut self.planes {
            plane.sync_gpu(queue, &self.volume);
        }
    }
}
