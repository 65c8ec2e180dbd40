//! Instance wrappers that reposition or reorient another hittable.

use crate::{HitRecord, Hittable, Ray};
use mcrt_math::{Aabb, Interval, Vec3};
use rand::RngCore;

/// Moves an object by a fixed offset.
pub struct Translate<H: Hittable> {
    object: H,
    offset: Vec3,
}

impl<H: Hittable> Translate<H> {
    pub fn new(object: H, offset: Vec3) -> Self {
        Self { object, offset }
    }
}

impl<H: Hittable> Hittable for Translate<H> {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        // Move the ray into object space, then the hit point back out
        let moved = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());
        let mut rec = self.object.hit(&moved, ray_t)?;
        rec.p += self.offset;
        Some(rec)
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Aabb {
        self.object.bounding_box(time0, time1).translate(self.offset)
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.object.pdf_value(origin - self.offset, direction)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.object.random(origin - self.offset, rng)
    }
}

/// Reverses the normal of another object, e.g. a ceiling light that must
/// face down.
pub struct FlipFace<H: Hittable> {
    object: H,
}

impl<H: Hittable> FlipFace<H> {
    pub fn new(object: H) -> Self {
        Self { object }
    }
}

impl<H: Hittable> Hittable for FlipFace<H> {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut rec = self.object.hit(ray, ray_t)?;
        rec.normal = -rec.normal;
        Some(rec)
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Aabb {
        self.object.bounding_box(time0, time1)
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.object.pdf_value(origin, direction)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.object.random(origin, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AaRect, Lambertian, Plane, Sphere};

    #[test]
    fn test_translate_moves_hit_and_box() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, Lambertian::new(Vec3::ONE));
        let moved = Translate::new(sphere, Vec3::new(5.0, 0.0, 0.0));

        let ray = Ray::new_simple(Vec3::new(5.0, 0.0, 10.0), -Vec3::Z);
        let rec = moved.hit(&ray, Interval::from_min(0.001)).unwrap();
        assert!((rec.t - 9.0).abs() < 1e-4);
        assert!((rec.p - Vec3::new(5.0, 0.0, 1.0)).length() < 1e-4);

        let bbox = moved.bounding_box(0.0, 1.0);
        assert!((bbox.min().x - 4.0).abs() < 1e-5);
        assert!((bbox.max().x - 6.0).abs() < 1e-5);

        let straight = Ray::new_simple(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z);
        assert!(moved.hit(&straight, Interval::from_min(0.001)).is_none());
    }

    #[test]
    fn test_translate_moves_light_sampling() {
        let rect = AaRect::new(Plane::Xz, -1.0, 1.0, -1.0, 1.0, 0.0, Lambertian::new(Vec3::ONE));
        let moved = Translate::new(rect, Vec3::new(0.0, 2.0, 0.0));

        assert!((moved.pdf_value(Vec3::ZERO, Vec3::Y) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_flip_face_negates_normal_only() {
        let rect = AaRect::new(Plane::Xz, -1.0, 1.0, -1.0, 1.0, 2.0, Lambertian::new(Vec3::ONE));
        let expected_pdf = rect.pdf_value(Vec3::ZERO, Vec3::Y);
        let flipped = FlipFace::new(rect);

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::Y);
        let rec = flipped.hit(&ray, Interval::from_min(0.001)).unwrap();
        assert_eq!(rec.normal, -Vec3::Y);
        assert!((rec.t - 2.0).abs() < 1e-5);
        assert_eq!(flipped.pdf_value(Vec3::ZERO, Vec3::Y), expected_pdf);
    }
}
