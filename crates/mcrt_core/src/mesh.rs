//! Triangle mesh representation for imported assets.
//!
//! A `Mesh` is what the importer hands to the renderer: indexed positions
//! with per-vertex shading normals. The renderer only ever consumes it as a
//! flat list of vertex triplets (see [`Mesh::triangles`]).

use mcrt_math::{Aabb, Vec3};

/// A mesh vertex as seen by the renderer: position plus shading normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }
}

/// A mesh consisting of vertex positions, optional normals, and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Mesh name from the asset, if any
    pub name: String,

    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (one per position when present)
    pub normals: Option<Vec<Vec3>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices, optionally with normals.
    ///
    /// Normals are NOT computed automatically; see [`Mesh::ensure_normals`].
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        normals: Option<Vec<Vec3>>,
    ) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            name: name.into(),
            positions,
            normals,
            indices,
            bounds,
        }
    }

    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        if positions.is_empty() {
            return Aabb::EMPTY;
        }

        let (min, max) = positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );

        Aabb::from_points(min, max)
    }

    /// Compute smooth vertex normals by accumulating area-weighted face normals.
    ///
    /// Faces are assumed counter-clockwise (OBJ convention).
    pub fn compute_normals(&mut self) {
        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for face in self.valid_faces() {
            let [i0, i1, i2] = face;
            let p0 = self.positions[i0];
            let face_normal = (self.positions[i1] - p0).cross(self.positions[i2] - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            *normal = normal.try_normalize().unwrap_or(Vec3::Y);
        }

        self.normals = Some(normals);
    }

    /// Ensure the mesh has one normal per vertex, computing them if necessary.
    pub fn ensure_normals(&mut self) {
        let should_compute = match &self.normals {
            None => true,
            Some(normals) => normals.len() != self.positions.len(),
        };

        if should_compute {
            if let Some(normals) = &self.normals {
                log::debug!(
                    "Mesh {}: normal count ({}) doesn't match vertex count ({}), computing smooth normals",
                    self.name,
                    normals.len(),
                    self.positions.len()
                );
            }
            self.compute_normals();
        }
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Index triplets that reference existing vertices.
    fn valid_faces(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let vertex_count = self.positions.len();
        self.indices.chunks_exact(3).filter_map(move |chunk| {
            let face = [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize];
            if face.iter().all(|&i| i < vertex_count) {
                Some(face)
            } else {
                log::warn!(
                    "Mesh {}: invalid triangle indices {:?}, vertex count: {}",
                    self.name,
                    face,
                    vertex_count
                );
                None
            }
        })
    }

    /// Flatten the mesh into vertex triplets, one per triangle.
    ///
    /// Meshes without normals get smooth normals computed on a copy; call
    /// [`Mesh::ensure_normals`] first to avoid recomputing them.
    pub fn triangles(&self) -> Vec<[Vertex; 3]> {
        let computed;
        let normals = match &self.normals {
            Some(normals) if normals.len() == self.positions.len() => normals,
            _ => {
                let mut copy = self.clone();
                copy.compute_normals();
                computed = copy.normals.unwrap_or_default();
                &computed
            }
        };

        self.valid_faces()
            .map(|face| face.map(|i| Vertex::new(self.positions[i], normals[i])))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ];
        // Two CCW triangles viewed from +Z
        Mesh::new("quad", positions, vec![0, 1, 2, 1, 3, 2], None)
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = quad();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.normals.is_none());
    }

    #[test]
    fn test_compute_normals_ccw() {
        let mut mesh = quad();
        mesh.compute_normals();

        let normals = mesh.normals.as_ref().unwrap();
        for normal in normals {
            assert!((*normal - Vec3::Z).length() < 0.001);
        }
    }

    #[test]
    fn test_ensure_normals_replaces_mismatched_normals() {
        let mut mesh = quad();
        mesh.normals = Some(vec![Vec3::X]);
        mesh.ensure_normals();

        assert_eq!(mesh.normals.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn test_bounds_computation() {
        let positions = vec![
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let mesh = Mesh::new("tri", positions, vec![0, 1, 2], None);

        assert_eq!(mesh.bounds.min(), Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(mesh.bounds.max(), Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_triangles_carry_vertex_normals() {
        let mut mesh = quad();
        mesh.normals = Some(vec![Vec3::Z, Vec3::X, Vec3::Y, -Vec3::Z]);

        let triangles = mesh.triangles();
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles[1][0], Vertex::new(Vec3::new(1.0, 0.0, 0.0), Vec3::X));
        assert_eq!(triangles[1][1].normal, -Vec3::Z);
        assert_eq!(triangles[1][2].position, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_triangles_skip_out_of_range_indices() {
        let mut mesh = quad();
        mesh.indices.extend_from_slice(&[0, 1, 9]);

        assert_eq!(mesh.triangles().len(), 2);
    }
}
