//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{
    gen_f32,
    hittable::{HitRecord, Hittable},
    Material, Ray,
};
use mcrt_core::Vertex;
use mcrt_math::{Aabb, Interval, Vec3};
use rand::RngCore;

/// Determinants below this are treated as a ray parallel to the triangle.
const PARALLEL_EPSILON: f32 = 1e-5;

/// A triangle primitive with per-vertex shading normals.
pub struct Triangle<M: Material> {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Shading normals, interpolated across the face
    n0: Vec3,
    n1: Vec3,
    n2: Vec3,
    /// Material
    material: M,
    /// Bounding box
    bbox: Aabb,
}

impl<M: Material> Triangle<M> {
    /// Create a flat-shaded triangle. The normal follows the CCW winding.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: M) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        Self::from_vertices(
            [
                Vertex::new(v0, normal),
                Vertex::new(v1, normal),
                Vertex::new(v2, normal),
            ],
            material,
        )
    }

    /// Create a triangle from imported vertices (smooth shading).
    ///
    /// Normals are used as given; winding is not checked against them.
    pub fn from_vertices(vertices: [Vertex; 3], material: M) -> Self {
        let [a, b, c] = vertices;
        let bbox = Aabb::from_points(
            a.position.min(b.position).min(c.position),
            a.position.max(b.position).max(c.position),
        );

        Self {
            v0: a.position,
            v1: b.position,
            v2: c.position,
            n0: a.normal,
            n1: b.normal,
            n2: c.normal,
            material,
            bbox,
        }
    }

    pub fn area(&self) -> f32 {
        0.5 * (self.v1 - self.v0).cross(self.v2 - self.v0).length()
    }
}

impl<M: Material> Hittable for Triangle<M> {
    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let det = edge1.dot(h);

        // Ray is parallel to triangle
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / det;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);

        // Check if intersection is outside triangle (u parameter)
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);

        // Check if intersection is outside triangle (v parameter)
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.contains(t) {
            return None;
        }

        let normal = ((1.0 - u - v) * self.n0 + u * self.n1 + v * self.n2).normalize_or_zero();

        Some(HitRecord {
            p: ray.at(t),
            normal,
            material: &self.material,
            u,
            v,
            t,
        })
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Aabb {
        self.bbox
    }

    /// Solid-angle density of hitting the triangle from `origin`.
    ///
    /// Not clamped: grazing directions give very large values.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let ray = Ray::new_simple(origin, direction);
        let Some(rec) = self.hit(&ray, Interval::from_min(0.001)) else {
            return 0.0;
        };

        let length = direction.length();
        let distance_squared = rec.t * rec.t * length * length;
        let cosine = (direction.dot(rec.normal) / length).abs();
        distance_squared / (cosine * self.area())
    }

    /// Direction toward a uniformly distributed point on the triangle.
    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let r1 = gen_f32(rng).sqrt();
        let r2 = gen_f32(rng);
        let point = (1.0 - r1) * self.v0 + r1 * (1.0 - r2) * self.v1 + r1 * r2 * self.v2;
        point - origin
    }
}
