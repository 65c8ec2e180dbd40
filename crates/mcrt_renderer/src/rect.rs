//! Axis-aligned rectangles, the usual shape for area lights and box walls.

use crate::{gen_f32, HitRecord, Hittable, Material, Ray};
use mcrt_math::{Aabb, Interval, Vec3};
use rand::RngCore;

/// The plane a rectangle lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Xy,
    Xz,
    Yz,
}

impl Plane {
    /// Axis indices `(a, b, k)`: the two in-plane axes and the constant one.
    fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::Xy => (0, 1, 2),
            Plane::Xz => (0, 2, 1),
            Plane::Yz => (1, 2, 0),
        }
    }
}

/// Rectangle `[a0, a1] x [b0, b1]` at coordinate `k` on the remaining axis.
///
/// The normal is the positive unit vector along the constant axis. Wrap in
/// [`crate::FlipFace`] to make it face the other way.
pub struct AaRect<M: Material> {
    plane: Plane,
    a0: f32,
    a1: f32,
    b0: f32,
    b1: f32,
    k: f32,
    material: M,
    bbox: Aabb,
}

impl<M: Material> AaRect<M> {
    pub fn new(plane: Plane, a0: f32, a1: f32, b0: f32, b1: f32, k: f32, material: M) -> Self {
        let (a0, a1) = (a0.min(a1), a0.max(a1));
        let (b0, b1) = (b0.min(b1), b0.max(b1));
        let bbox = Aabb::from_points(
            compose(plane, a0, b0, k),
            compose(plane, a1, b1, k),
        );

        Self {
            plane,
            a0,
            a1,
            b0,
            b1,
            k,
            material,
            bbox,
        }
    }

    pub fn area(&self) -> f32 {
        (self.a1 - self.a0) * (self.b1 - self.b0)
    }

    fn normal(&self) -> Vec3 {
        compose(self.plane, 0.0, 0.0, 1.0)
    }
}

/// Build a point from in-plane coordinates `(a, b)` and plane offset `k`.
fn compose(plane: Plane, a: f32, b: f32, k: f32) -> Vec3 {
    let (ia, ib, ik) = plane.axes();
    let mut p = Vec3::ZERO;
    p[ia] = a;
    p[ib] = b;
    p[ik] = k;
    p
}

impl<M: Material> Hittable for AaRect<M> {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let (ia, ib, ik) = self.plane.axes();
        let origin = ray.origin();
        let direction = ray.direction();

        if direction[ik] == 0.0 {
            return None;
        }

        let t = (self.k - origin[ik]) / direction[ik];
        if !ray_t.contains(t) {
            return None;
        }

        let a = origin[ia] + t * direction[ia];
        let b = origin[ib] + t * direction[ib];
        if a < self.a0 || a > self.a1 || b < self.b0 || b > self.b1 {
            return None;
        }

        Some(HitRecord {
            p: ray.at(t),
            normal: self.normal(),
            material: &self.material,
            u: (a - self.a0) / (self.a1 - self.a0),
            v: (b - self.b0) / (self.b1 - self.b0),
            t,
        })
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Aabb {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let ray = Ray::new_simple(origin, direction);
        let Some(rec) = self.hit(&ray, Interval::from_min(0.001)) else {
            return 0.0;
        };

        let distance_squared = rec.t * rec.t * direction.length_squared();
        let cosine = (direction.dot(rec.normal) / direction.length()).abs();
        distance_squared / (cosine * self.area())
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let a = self.a0 + gen_f32(rng) * (self.a1 - self.a0);
        let b = self.b0 + gen_f32(rng) * (self.b1 - self.b0);
        compose(self.plane, a, b, self.k) - origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn light() -> AaRect<Lambertian> {
        AaRect::new(Plane::Xz, 213.0, 343.0, 227.0, 332.0, 554.0, Lambertian::new(Vec3::ONE))
    }

    #[test]
    fn test_rect_hit_and_uv() {
        let rect = AaRect::new(Plane::Xy, 0.0, 2.0, 0.0, 4.0, -5.0, Lambertian::new(Vec3::ONE));

        let ray = Ray::new_simple(Vec3::new(0.5, 3.0, 0.0), -Vec3::Z);
        let rec = rect.hit(&ray, Interval::from_min(0.001)).unwrap();

        assert!((rec.t - 5.0).abs() < 1e-5);
        assert!((rec.u - 0.25).abs() < 1e-5);
        assert!((rec.v - 0.75).abs() < 1e-5);
        assert_eq!(rec.normal, Vec3::Z);

        let outside = Ray::new_simple(Vec3::new(3.0, 1.0, 0.0), -Vec3::Z);
        assert!(rect.hit(&outside, Interval::from_min(0.001)).is_none());

        let parallel = Ray::new_simple(Vec3::new(0.5, 1.0, -5.0), Vec3::X);
        assert!(rect.hit(&parallel, Interval::from_min(0.001)).is_none());
    }

    #[test]
    fn test_rect_bbox_is_padded() {
        let bbox = light().bounding_box(0.0, 1.0);
        assert!(bbox.y.size() > 0.0);
        assert!(bbox.y.contains(554.0));
    }

    #[test]
    fn test_rect_pdf_straight_below() {
        let rect = AaRect::new(Plane::Xz, -1.0, 1.0, -1.0, 1.0, 2.0, Lambertian::new(Vec3::ONE));

        // distance 2, cosine 1, area 4
        assert!((rect.pdf_value(Vec3::ZERO, Vec3::Y) - 1.0).abs() < 1e-5);
        assert_eq!(rect.pdf_value(Vec3::ZERO, -Vec3::Y), 0.0);
    }

    #[test]
    fn test_rect_random_points_hit_rect() {
        let rect = light();
        let origin = Vec3::new(278.0, 100.0, 278.0);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let dir = rect.random(origin, &mut rng);
            let ray = Ray::new_simple(origin, dir);
            let rec = rect.hit(&ray, Interval::from_min(0.001)).unwrap();
            assert!((rec.t - 1.0).abs() < 1e-3);
            assert!(rect.pdf_value(origin, dir) > 0.0);
        }
    }
}
