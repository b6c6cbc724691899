//! # Volume Module
//!
//! Regular 3-D intensity grids, their index-space extents, and the extraction of
//! single-voxel slabs for display.
//!
//! Samples are stored x-fastest (`index = i + nx * (j + ny * k)`), the layout
//! NRRD files use on disk.

pub mod window_level;

use std::fmt;

use cgmath::Vector3;

use crate::geometry::Bounds;
use window_level::WindowLevel;

/// One of the three grid axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two axes spanning a slab that collapses `self`, as (horizontal, vertical).
    pub fn in_plane_axes(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }
}

/// Inclusive voxel index ranges `(x0, x1, y0, y1, z0, z1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent(pub [i32; 6]);

impl Extent {
    pub fn new(x0: i32, x1: i32, y0: i32, y1: i32, z0: i32, z1: i32) -> Self {
        Extent([x0, x1, y0, y1, z0, z1])
    }

    /// Extent of a grid with the given sample counts, starting at index 0.
    pub fn from_dims(dims: [usize; 3]) -> Self {
        let last = |n: usize| n as i32 - 1;
        Extent::new(0, last(dims[0]), 0, last(dims[1]), 0, last(dims[2]))
    }

    pub fn axis(&self, axis: Axis) -> (i32, i32) {
        let i = axis.index() * 2;
        (self.0[i], self.0[i + 1])
    }

    pub fn set_axis(&mut self, axis: Axis, lo: i32, hi: i32) {
        let i = axis.index() * 2;
        self.0[i] = lo;
        self.0[i + 1] = hi;
    }

    /// Integer-floor midpoint along `axis`.
    pub fn midpoint(&self, axis: Axis) -> i32 {
        let (lo, hi) = self.axis(axis);
        (lo + hi).div_euclid(2)
    }

    /// Number of indices along `axis`, zero for an inverted range.
    pub fn len(&self, axis: Axis) -> usize {
        let (lo, hi) = self.axis(axis);
        if hi < lo {
            0
        } else {
            (hi - lo + 1) as usize
        }
    }

    pub fn contains(&self, axis: Axis, index: i32) -> bool {
        let (lo, hi) = self.axis(axis);
        (lo..=hi).contains(&index)
    }

    /// `index` pulled into the range of `axis`.
    pub fn clamp_index(&self, axis: Axis, index: i32) -> i32 {
        let (lo, hi) = self.axis(axis);
        if hi < lo {
            return lo;
        }
        index.clamp(lo, hi)
    }

    /// Single-voxel slab of `self` collapsed to `index` along `axis`.
    pub fn slab(&self, axis: Axis, index: i32) -> Extent {
        let mut slab = *self;
        slab.set_axis(axis, index, index);
        slab
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x0, x1, y0, y1, z0, z1] = self.0;
        write!(f, "({x0}, {x1}, {y0}, {y1}, {z0}, {z1})")
    }
}

/// A 2-D grid of intensities cut out of a [`Volume`]
#[derive(Debug, Clone, PartialEq)]
pub struct SliceImage {
    pub width: usize,
    pub height: usize,
    /// Row-major, row 0 at the low end of the vertical axis
    pub values: Vec<f32>,
}

impl SliceImage {
    /// RGBA8 pixels with the window/level mapping applied, alpha opaque.
    pub fn to_rgba(&self, window_level: &WindowLevel) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(self.values.len() * 4);
        for &value in &self.values {
            let gray = window_level.eval(value);
            pixels.extend_from_slice(&[gray, gray, gray, u8::MAX]);
        }
        pixels
    }
}

/// A regular 3-D grid of scalar intensities. Immutable after load.
#[derive(Debug, Clone)]
pub struct Volume {
    dims: [usize; 3],
    spacing: [f32; 3],
    origin: [f32; 3],
    data: Vec<f32>,
}

impl Volume {
    /// Wraps `data` as an `nx * ny * nz` grid with unit spacing at the origin.
    ///
    /// Returns `None` if the sample count does not match the dimensions or a
    /// dimension is zero.
    pub fn new(dims: [usize; 3], data: Vec<f32>) -> Option<Self> {
        let expected = dims.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n))?;
        if expected == 0 || expected != data.len() {
            return None;
        }
        Some(Self {
            dims,
            spacing: [1.0; 3],
            origin: [0.0; 3],
            data,
        })
    }

    pub fn with_spacing(mut self, spacing: [f32; 3]) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_origin(mut self, origin: [f32; 3]) -> Self {
        self.origin = origin;
        self
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn spacing(&self) -> [f32; 3] {
        self.spacing
    }

    pub fn origin(&self) -> [f32; 3] {
        self.origin
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn extent(&self) -> Extent {
        Extent::from_dims(self.dims)
    }

    /// Sample at voxel `(i, j, k)`, `None` outside the grid.
    pub fn value(&self, i: i32, j: i32, k: i32) -> Option<f32> {
        let [nx, ny, nz] = self.dims;
        if i < 0 || j < 0 || k < 0 {
            return None;
        }
        let (i, j, k) = (i as usize, j as usize, k as usize);
        if i >= nx || j >= ny || k >= nz {
            return None;
        }
        self.data.get(i + nx * (j + ny * k)).copied()
    }

    /// World position of a (possibly fractional) voxel index.
    pub fn index_to_world(&self, index: [f32; 3]) -> Vector3<f32> {
        Vector3::new(
            self.origin[0] + self.spacing[0] * index[0],
            self.origin[1] + self.spacing[1] * index[1],
            self.origin[2] + self.spacing[2] * index[2],
        )
    }

    /// World-space bounds of the voxel centers.
    pub fn world_bounds(&self) -> Bounds {
        let extent = self.extent();
        let (x0, x1) = extent.axis(Axis::X);
        let (y0, y1) = extent.axis(Axis::Y);
        let (z0, z1) = extent.axis(Axis::Z);
        let mut bounds = Bounds::new(
            self.index_to_world([x0 as f32, y0 as f32, z0 as f32]),
            self.index_to_world([x0 as f32, y0 as f32, z0 as f32]),
        );
        bounds.include(self.index_to_world([x1 as f32, y1 as f32, z1 as f32]));
        bounds
    }

    /// Extracts the slab `display_extent` collapses along `axis`.
    ///
    /// The in-plane ranges of `display_extent` are intersected with the grid.
    /// Returns `None` when the slab index lies outside the grid or nothing of
    /// the slab overlaps it.
    pub fn extract_slice(&self, axis: Axis, display_extent: &Extent) -> Option<SliceImage> {
        let full = self.extent();
        let (index, _) = display_extent.axis(axis);
        let (axis_lo, axis_hi) = full.axis(axis);
        if index < axis_lo || index > axis_hi {
            return None;
        }

        let (u_axis, v_axis) = axis.in_plane_axes();
        let clip = |a: Axis| {
            let (lo, hi) = display_extent.axis(a);
            let (full_lo, full_hi) = full.axis(a);
            (lo.max(full_lo), hi.min(full_hi))
        };
        let (u0, u1) = clip(u_axis);
        let (v0, v1) = clip(v_axis);
        if u1 < u0 || v1 < v0 {
            return None;
        }

        let width = (u1 - u0 + 1) as usize;
        let height = (v1 - v0 + 1) as usize;
        let mut values = Vec::with_capacity(width * height);
        let mut voxel = [0i32; 3];
        voxel[axis.index()] = index;
        for v in v0..=v1 {
            voxel[v_axis.index()] = v;
            for u in u0..=u1 {
                voxel[u_axis.index()] = u;
                values.push(self.value(voxel[0], voxel[1], voxel[2]).unwrap_or(0.0));
            }
        }

        Some(SliceImage {
            width,
            height,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Volume whose sample at (i, j, k) is `100 * k + 10 * j + i`.
    fn ramp_volume(dims: [usize; 3]) -> Volume {
        let mut data = Vec::new();
        for k in 0..dims[2] {
            for j in 0..dims[1] {
                for i in 0..dims[0] {
                    data.push((100 * k + 10 * j + i) as f32);
                }
            }
        }
        Volume::new(dims, data).unwrap()
    }

    #[test]
    fn test_extent_from_dims_and_midpoints() {
        let extent = Extent::from_dims([256, 256, 200]);
        assert_eq!(extent, Extent::new(0, 255, 0, 255, 0, 199));
        assert_eq!(extent.midpoint(Axis::X), 127);
        assert_eq!(extent.midpoint(Axis::Y), 127);
        assert_eq!(extent.midpoint(Axis::Z), 99);
        assert_eq!(extent.to_string(), "(0, 255, 0, 255, 0, 199)");
    }

    #[test]
    fn test_midpoint_floors_negative_sums() {
        let extent = Extent::new(-3, 0, 0, 1, 5, 5);
        assert_eq!(extent.midpoint(Axis::X), -2);
        assert_eq!(extent.midpoint(Axis::Y), 0);
        assert_eq!(extent.midpoint(Axis::Z), 5);
    }

    #[test]
    fn test_slab_collapses_one_axis() {
        let full = Extent::from_dims([4, 4, 4]);
        let slab = full.slab(Axis::X, 3);
        assert_eq!(slab.axis(Axis::X), (3, 3));
        assert_eq!(slab.axis(Axis::Y), (0, 3));
        assert!(!full.contains(Axis::X, 4));
        assert!(!full.contains(Axis::Z, -1));
    }

    #[test]
    fn test_clamp_index() {
        let full = Extent::from_dims([10, 1, 3]);
        assert_eq!(full.clamp_index(Axis::X, 12), 9);
        assert_eq!(full.clamp_index(Axis::X, -4), 0);
        assert_eq!(full.clamp_index(Axis::Z, 1), 1);
        assert!(full.contains(Axis::Y, 0));
        assert!(!full.contains(Axis::Y, 1));
    }

    #[test]
    fn test_volume_rejects_wrong_sample_count() {
        assert!(Volume::new([2, 2, 2], vec![0.0; 7]).is_none());
        assert!(Volume::new([0, 2, 2], vec![]).is_none());
    }

    #[test]
    fn test_value_lookup() {
        let volume = ramp_volume([3, 4, 5]);
        assert_eq!(volume.value(2, 3, 4), Some(432.0));
        assert_eq!(volume.value(3, 0, 0), None);
        assert_eq!(volume.value(-1, 0, 0), None);
    }

    #[test]
    fn test_extract_axial_slice() {
        let volume = ramp_volume([3, 4, 5]);
        let slab = volume.extent().slab(Axis::Z, 2);
        let slice = volume.extract_slice(Axis::Z, &slab).unwrap();
        assert_eq!((slice.width, slice.height), (3, 4));
        assert_eq!(slice.values[0], 200.0);
        // row 1 (j = 1), column 2 (i = 2)
        assert_eq!(slice.values[3 + 2], 212.0);
    }

    #[test]
    fn test_extract_sagittal_slice_layout() {
        let volume = ramp_volume([3, 4, 5]);
        let slab = volume.extent().slab(Axis::X, 1);
        let slice = volume.extract_slice(Axis::X, &slab).unwrap();
        // horizontal is Y, vertical is Z
        assert_eq!((slice.width, slice.height), (4, 5));
        assert_eq!(slice.values[0], 1.0);
        assert_eq!(slice.values[4 * 2 + 3], 231.0);
    }

    #[test]
    fn test_extract_out_of_range_slice() {
        let volume = ramp_volume([3, 4, 5]);
        let slab = volume.extent().slab(Axis::Y, 4);
        assert!(volume.extract_slice(Axis::Y, &slab).is_none());
    }

    #[test]
    fn test_world_bounds_follow_spacing_and_origin() {
        let volume = ramp_volume([3, 4, 5])
            .with_spacing([0.5, 1.0, 2.0])
            .with_origin([10.0, 0.0, -4.0]);
        let bounds = volume.world_bounds();
        assert_eq!(bounds.min, Vector3::new(10.0, 0.0, -4.0));
        assert_eq!(bounds.max, Vector3::new(11.0, 3.0, 4.0));
    }

    #[test]
    fn test_slice_rgba_uses_window_level() {
        let slice = SliceImage {
            width: 2,
            height: 1,
            values: vec![0.0, 1000.0],
        };
        let rgba = slice.to_rgba(&WindowLevel::scan_default());
        assert_eq!(rgba, vec![0, 0, 0, 255, 255, 255, 255, 255]);
    }
}
