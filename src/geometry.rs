//! CPU-side geometry: axis-aligned bounds and triangulated surface meshes.

use cgmath::{InnerSpace, Vector3};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Bounds {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Bounds of a point set, `None` when the set is empty.
    pub fn from_points(points: &[[f32; 3]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Bounds::new(Vector3::from(*first), Vector3::from(*first));
        for p in rest {
            bounds.include(Vector3::from(*p));
        }
        Some(bounds)
    }

    pub fn include(&mut self, p: Vector3<f32>) {
        self.min = Vector3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Vector3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        let mut merged = *self;
        merged.include(other.min);
        merged.include(other.max);
        merged
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Radius of the bounding sphere around [`Bounds::center`].
    pub fn radius(&self) -> f32 {
        (self.max - self.min).magnitude() * 0.5
    }
}

/// A triangulated surface with per-vertex normals
#[derive(Debug, Clone, Default)]
pub struct SurfaceMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    /// Builds a mesh, computing normals when `normals` does not match `positions`.
    pub fn new(
        positions: Vec<[f32; 3]>,
        normals: Option<Vec<[f32; 3]>>,
        indices: Vec<u32>,
    ) -> Self {
        let normals = match normals {
            Some(normals) if normals.len() == positions.len() => normals,
            _ => Self::calculate_vertex_normals(&positions, &indices),
        };
        Self {
            positions,
            normals,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.positions)
    }

    /// Averages the (area weighted) normals of the faces around each vertex.
    pub fn calculate_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
        let mut sums = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len()];

        for triangle in indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
            if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
                continue;
            }
            let v0 = Vector3::from(positions[i0]);
            let edge1 = Vector3::from(positions[i1]) - v0;
            let edge2 = Vector3::from(positions[i2]) - v0;
            let face_normal = edge1.cross(edge2);

            for idx in [i0, i1, i2] {
                sums[idx] += face_normal;
            }
        }

        sums.into_iter()
            .map(|n| {
                let length = n.magnitude();
                if length > 0.0 {
                    (n / length).into()
                } else {
                    [0.0, 0.0, 1.0]
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_points() {
        let bounds =
            Bounds::from_points(&[[0.0, 0.0, 0.0], [1.0, 2.0, 3.0], [-1.0, -1.0, -1.0]]).unwrap();
        assert_eq!(bounds.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(bounds.max, Vector3::new(1.0, 2.0, 3.0));
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounds_union_and_center() {
        let a = Bounds::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let b = Bounds::new(Vector3::new(2.0, -1.0, 0.5), Vector3::new(3.0, 0.0, 4.0));
        let merged = a.union(&b);
        assert_eq!(merged.min, Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(merged.max, Vector3::new(3.0, 1.0, 4.0));
        assert_eq!(merged.center(), Vector3::new(1.5, 0.0, 2.0));
    }

    #[test]
    fn test_computed_normals_face_up_for_ccw_triangle() {
        let mesh = SurfaceMesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            None,
            vec![0, 1, 2],
        );
        for normal in &mesh.normals {
            assert_eq!(*normal, [0.0, 0.0, 1.0]);
        }
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_mismatched_normals_are_recomputed() {
        let mesh = SurfaceMesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            Some(vec![[1.0, 0.0, 0.0]]),
            vec![0, 1, 2],
        );
        assert_eq!(mesh.normals.len(), 3);
        assert_eq!(mesh.normals[0], [0.0, 0.0, 1.0]);
    }
}
