//! Axis-aligned cross-section planes through the volume

use crate::{
    gfx::{
        rendering::vertex::SliceVertex,
        resources::{MaterialLayouts, SliceBuffers},
    },
    volume::{window_level::WindowLevel, Axis, Extent, SliceImage, Volume},
};

/// Which axis a plane collapses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Collapses X
    Sagittal,
    /// Collapses Y
    Coronal,
    /// Collapses Z
    Axial,
}

impl Orientation {
    pub const ALL: [Orientation; 3] = [
        Orientation::Sagittal,
        Orientation::Coronal,
        Orientation::Axial,
    ];

    pub fn axis(self) -> Axis {
        match self {
            Orientation::Sagittal => Axis::X,
            Orientation::Coronal => Axis::Y,
            Orientation::Axial => Axis::Z,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Orientation::Sagittal => "sagittal",
            Orientation::Coronal => "coronal",
            Orientation::Axial => "axial",
        }
    }
}

/// How slab stepping treats the volume bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepPolicy {
    /// Stop at the first and last slice
    #[default]
    Clamped,
    /// Step without limit; a slab outside the volume is simply not drawn
    Unbounded,
}

impl std::fmt::Display for StepPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepPolicy::Clamped => write!(f, "clamped to the volume extent"),
            StepPolicy::Unbounded => write!(f, "unclamped, slabs may leave the volume"),
        }
    }
}

/// One cross-section plane: a one-voxel slab of the volume shown through a
/// fixed window/level mapping.
pub struct SlicePlane {
    orientation: Orientation,
    display_extent: Extent,
    volume_extent: Extent,
    window_level: WindowLevel,
    policy: StepPolicy,
    dirty: bool,
    gpu: Option<SliceBuffers>,
}

impl SlicePlane {
    /// Places the plane at the midpoint of `volume_extent` on its axis.
    pub fn new(
        orientation: Orientation,
        volume_extent: Extent,
        window_level: WindowLevel,
        policy: StepPolicy,
    ) -> Self {
        let axis = orientation.axis();
        let display_extent = volume_extent.slab(axis, volume_extent.midpoint(axis));
        Self {
            orientation,
            display_extent,
            volume_extent,
            window_level,
            policy,
            dirty: true,
            gpu: None,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn display_extent(&self) -> Extent {
        self.display_extent
    }

    pub fn window_level(&self) -> WindowLevel {
        self.window_level
    }

    /// The `(lo, hi)` bounds of the slab on the collapsed axis; always equal.
    pub fn slab(&self) -> (i32, i32) {
        self.display_extent.axis(self.orientation.axis())
    }

    pub fn slice_index(&self) -> i32 {
        self.slab().0
    }

    /// Moves the slab by `delta` along the collapsed axis.
    ///
    /// Returns whether the slab moved. Under [`StepPolicy::Clamped`] a step
    /// past either end of the volume leaves the plane where it is.
    pub fn step(&mut self, delta: i32) -> bool {
        let axis = self.orientation.axis();
        let current = self.slice_index();
        let target = match self.policy {
            StepPolicy::Clamped => self
                .volume_extent
                .clamp_index(axis, current.saturating_add(delta)),
            StepPolicy::Unbounded => current.saturating_add(delta),
        };
        if target == current {
            return false;
        }
        self.display_extent.set_axis(axis, target, target);
        self.dirty = true;
        log::debug!("{} slab at {}", self.orientation.name(), target);
        true
    }

    /// Whether the slab intersects the volume
    pub fn is_visible(&self) -> bool {
        self.volume_extent
            .contains(self.orientation.axis(), self.slice_index())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Pixels for the current slab, or `None` outside the volume
    pub fn image(&self, volume: &Volume) -> Option<SliceImage> {
        volume.extract_slice(self.orientation.axis(), &self.display_extent)
    }

    /// World-space quad through the voxel centers of the current slab.
    ///
    /// Corners run (u0, v0), (u1, v0), (u1, v1), (u0, v1) over the in-plane
    /// axes. Texture coordinates are inset by half a texel so each texel
    /// center lands on its voxel center.
    pub fn quad(&self, volume: &Volume) -> [SliceVertex; 4] {
        let axis = self.orientation.axis();
        let (u_axis, v_axis) = axis.in_plane_axes();
        let (u0, u1) = self.display_extent.axis(u_axis);
        let (v0, v1) = self.display_extent.axis(v_axis);
        let index = self.slice_index() as f32;

        let width = (u1 - u0 + 1).max(1) as f32;
        let height = (v1 - v0 + 1).max(1) as f32;
        let (s0, s1) = (0.5 / width, 1.0 - 0.5 / width);
        let (t0, t1) = (0.5 / height, 1.0 - 0.5 / height);

        let corner = |u: i32, v: i32, tex_coords: [f32; 2]| {
            let mut voxel = [0.0f32; 3];
            voxel[axis.index()] = index;
            voxel[u_axis.index()] = u as f32;
            voxel[v_axis.index()] = v as f32;
            SliceVertex {
                position: volume.index_to_world(voxel).into(),
                tex_coords,
            }
        };

        [
            corner(u0, v0, [s0, t0]),
            corner(u1, v0, [s1, t0]),
            corner(u1, v1, [s1, t1]),
            corner(u0, v1, [s0, t1]),
        ]
    }

    pub fn gpu(&self) -> Option<&SliceBuffers> {
        self.gpu.as_ref()
    }

    /// Allocates the texture and quad. The texture is sized for the full
    /// in-plane extent, which does not change as the plane steps.
    pub fn init_gpu_resources(
        &mut self,
        device: &wgpu::Device,
        layouts: &MaterialLayouts,
        volume: &Volume,
        max_texture_dimension: u32,
    ) {
        let (u_axis, v_axis) = self.orientation.axis().in_plane_axes();
        let width = self.volume_extent.len(u_axis) as u32;
        let height = self.volume_extent.len(v_axis) as u32;
        if width > max_texture_dimension || height > max_texture_dimension {
            log::warn!(
                "{} slice is {}x{}, larger than the device allows ({}), not drawing it",
                self.orientation.name(),
                width,
                height,
                max_texture_dimension
            );
            return;
        }

        let label = format!("{} slice", self.orientation.name());
        self.gpu = Some(SliceBuffers::new(
            device,
            layouts,
            width,
            height,
            &self.quad(volume),
            &label,
        ));
        self.dirty = true;
    }

    /// Uploads the current slab if it changed since the last upload.
    pub fn sync_gpu(&mut self, queue: &wgpu::Queue, volume: &Volume) {
        if !self.dirty {
            return;
        }
        let Some(gpu) = &self.gpu else {
            return;
        };
        if let Some(image) = self.image(volume) {
            let rgba = image.to_rgba(&self.window_level);
            gpu.write_image(queue, &rgba, image.width as u32, image.height as u32);
            gpu.write_quad(queue, &self.quad(volume));
        }
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent() -> Extent {
        Extent::new(0, 255, 0, 255, 0, 199)
    }

    fn plane(orientation: Orientation, policy: StepPolicy) -> SlicePlane {
        SlicePlane::new(orientation, extent(), WindowLevel::default(), policy)
    }

    #[test]
    fn test_step_policy_describes_itself() {
        assert_eq!(StepPolicy::default(), StepPolicy::Clamped);
        assert_eq!(StepPolicy::Clamped.to_string(), "clamped to the volume extent");
        assert!(StepPolicy::Unbounded.to_string().starts_with("unclamped"));
    }

    #[test]
    fn test_planes_start_at_midpoints() {
        assert_eq!(plane(Orientation::Sagittal, StepPolicy::Clamped).slab(), (127, 127));
        assert_eq!(plane(Orientation::Coronal, StepPolicy::Clamped).slab(), (127, 127));
        assert_eq!(plane(Orientation::Axial, StepPolicy::Clamped).slab(), (99, 99));
    }

    #[test]
    fn test_in_plane_axes_span_volume() {
        let p = plane(Orientation::Axial, StepPolicy::Clamped);
        assert_eq!(p.display_extent(), Extent::new(0, 255, 0, 255, 99, 99));
    }

    #[test]
    fn test_unbounded_steps_past_the_volume() {
        let mut p = plane(Orientation::Sagittal, StepPolicy::Unbounded);
        for _ in 0..200 {
            assert!(p.step(1));
        }
        assert_eq!(p.slab(), (327, 327));
        assert!(!p.is_visible());
        for _ in 0..400 {
            p.step(-1);
        }
        assert_eq!(p.slab(), (-73, -73));
    }

    #[test]
    fn test_clamped_stops_at_bounds() {
        let mut p = plane(Orientation::Axial, StepPolicy::Clamped);
        for _ in 0..150 {
            p.step(1);
        }
        assert_eq!(p.slab(), (199, 199));
        assert!(!p.step(1));
        for _ in 0..300 {
            p.step(-1);
        }
        assert_eq!(p.slab(), (0, 0));
        assert!(p.is_visible());
    }

    #[test]
    fn test_quad_sits_on_the_slab() {
        let volume = Volume::new([4, 3, 2], vec![0.0; 24])
            .unwrap()
            .with_spacing([2.0, 1.0, 0.5])
            .with_origin([10.0, 0.0, 0.0]);
        let p = SlicePlane::new(
            Orientation::Sagittal,
            volume.extent(),
            WindowLevel::default(),
            StepPolicy::Clamped,
        );
        let quad = p.quad(&volume);
        // midpoint of 0..=3 is 1, at x = 10 + 2 * 1
        for vertex in &quad {
            assert_eq!(vertex.position[0], 12.0);
        }
        assert_eq!(quad[0].position, [12.0, 0.0, 0.0]);
        assert_eq!(quad[2].position, [12.0, 2.0, 0.5]);
        assert_eq!(quad[0].tex_coords, [0.5 / 3.0, 0.25]);
    }

    #[test]
    fn test_image_follows_the_slab() {
        let data: Vec<f32> = (0..8).map(|v| v as f32 * 100.0).collect();
        let volume = Volume::new([2, 2, 2], data).unwrap();
        let mut p = SlicePlane::new(
            Orientation::Axial,
            volume.extent(),
            WindowLevel::default(),
            StepPolicy::Unbounded,
        );
        assert_eq!(p.image(&volume).unwrap().values, vec![0.0, 100.0, 200.0, 300.0]);
        p.step(1);
        assert_eq!(p.image(&volume).unwrap().values, vec![400.0, 500.0, 600.0, 700.0]);
        p.step(1);
        assert!(p.image(&volume).is_none());
    }
}
