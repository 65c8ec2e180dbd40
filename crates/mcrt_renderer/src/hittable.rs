//! Hittable trait and HitRecord for ray-object intersection.

use crate::{gen_f32, Material, Ray};
use mcrt_math::{Aabb, Interval, Vec3};
use rand::RngCore;

/// Record of a ray-object intersection.
///
/// Lives only as long as the intersection query that produced it.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Unit surface normal, oriented by the primitive's own convention.
    /// It is NOT flipped to face the incoming ray.
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// Surface parametrization (barycentrics for triangles)
    pub u: f32,
    pub v: f32,
    /// Ray parameter of the intersection
    pub t: f32,
}

/// Trait for objects that can be hit by rays.
///
/// Shapes that can act as area lights also implement `pdf_value` and
/// `random` so the integrator can importance-sample directions toward them.
pub trait Hittable: Send + Sync {
    /// Closest intersection with `ray` whose parameter lies in `ray_t`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;

    /// Bounding box of the object over the shutter interval `[time0, time1]`.
    fn bounding_box(&self, time0: f32, time1: f32) -> Aabb;

    /// Density, with respect to solid angle at `origin`, of sampling
    /// `direction` with [`Hittable::random`]. Zero if the direction misses.
    fn pdf_value(&self, _origin: Vec3, _direction: Vec3) -> f32 {
        0.0
    }

    /// Random (not necessarily normalized) direction from `origin` toward
    /// the object's surface.
    fn random(&self, _origin: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
        Vec3::X
    }
}

impl<H: Hittable + ?Sized> Hittable for Box<H> {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        (**self).hit(ray, ray_t)
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Aabb {
        (**self).bounding_box(time0, time1)
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        (**self).pdf_value(origin, direction)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        (**self).random(origin, rng)
    }
}

/// A list of hittable objects, tested linearly.
///
/// Used for small groups (light proxies, boxes) and as the brute-force
/// reference the BVH must agree with.
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
}

impl HittableList {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: impl Hittable + 'static) {
        self.objects.push(Box::new(object));
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Hand the objects over, e.g. to build a BVH from them.
    pub fn into_objects(self) -> Vec<Box<dyn Hittable>> {
        self.objects
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Box<dyn Hittable>>> for HittableList {
    fn from(objects: Vec<Box<dyn Hittable>>) -> Self {
        Self { objects }
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;

        for object in &self.objects {
            let interval = closest.as_ref().map_or(ray_t, |rec| ray_t.with_max(rec.t));
            if let Some(rec) = object.hit(ray, interval) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Aabb {
        self.objects.iter().fold(Aabb::EMPTY, |acc, object| {
            Aabb::surrounding(&acc, &object.bounding_box(time0, time1))
        })
    }

    /// Members are picked uniformly by `random`, so the density is their mean.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        if self.objects.is_empty() {
            return 0.0;
        }

        let weight = 1.0 / self.objects.len() as f32;
        self.objects
            .iter()
            .map(|object| weight * object.pdf_value(origin, direction))
            .sum()
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        if self.objects.is_empty() {
            return Vec3::X;
        }

        let index = ((gen_f32(rng) * self.objects.len() as f32) as usize).min(self.objects.len() - 1);
        self.objects[index].random(origin, rng)
    }
}
