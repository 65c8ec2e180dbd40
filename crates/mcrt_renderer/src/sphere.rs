//! Sphere primitives for ray tracing.

use crate::{
    hittable::{HitRecord, Hittable},
    random::{random_to_sphere, random_unit_vector},
    Material, Ray,
};
use mcrt_math::{Aabb, Interval, Onb, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A sphere primitive.
///
/// The hit normal always points away from the center.
pub struct Sphere<M: Material> {
    center: Vec3,
    radius: f32,
    material: M,
    bbox: Aabb,
}

impl<M: Material> Sphere<M> {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: M) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

/// Get the UV coordinates for a point on the unit sphere.
fn sphere_uv(p: Vec3) -> (f32, f32) {
    // theta: angle down from +Y
    // phi: angle around Y axis from +X
    let theta = (-p.y).clamp(-1.0, 1.0).acos();
    let phi = (-p.z).atan2(p.x) + PI;

    (phi / (2.0 * PI), theta / PI)
}

/// Closest root of the ray/sphere quadratic within `ray_t`. Degenerate
/// spheres never report a hit.
fn hit_sphere<'a>(
    center: Vec3,
    radius: f32,
    material: &'a dyn Material,
    ray: &Ray,
    ray_t: Interval,
) -> Option<HitRecord<'a>> {
    let oc = center - ray.origin();
    let a = ray.direction().length_squared();
    let h = ray.direction().dot(oc);
    let c = oc.length_squared() - radius * radius;

    let discriminant = h * h - a * c;
    if discriminant < 0.0 || a == 0.0 || radius <= 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();

    // Find the nearest root in the acceptable range
    let mut root = (h - sqrtd) / a;
    if !ray_t.contains(root) {
        root = (h + sqrtd) / a;
        if !ray_t.contains(root) {
            return None;
        }
    }

    let p = ray.at(root);
    let normal = (p - center) / radius;
    let (u, v) = sphere_uv(normal);

    Some(HitRecord {
        p,
        normal,
        material,
        u,
        v,
        t: root,
    })
}

impl<M: Material> Hittable for Sphere<M> {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        hit_sphere(self.center, self.radius, &self.material, ray, ray_t)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Aabb {
        self.bbox
    }

    /// Uniform over the cone of directions the sphere subtends from `origin`.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let ray = Ray::new_simple(origin, direction);
        if self.hit(&ray, Interval::from_min(0.001)).is_none() {
            return 0.0;
        }

        let distance_squared = (self.center - origin).length_squared();
        let radius_squared = self.radius * self.radius;
        if distance_squared <= radius_squared {
            // Inside the sphere every direction hits
            return 1.0 / (4.0 * PI);
        }

        let cos_theta_max = (1.0 - radius_squared / distance_squared).sqrt();
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max);
        1.0 / solid_angle
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let direction = self.center - origin;
        let distance_squared = direction.length_squared();
        if distance_squared <= self.radius * self.radius {
            return random_unit_vector(rng);
        }

        let uvw = Onb::build_from_w(direction);
        uvw.local(random_to_sphere(self.radius, distance_squared, rng))
    }
}

/// A sphere whose center moves linearly from `center0` at `time0` to
/// `center1` at `time1`.
pub struct MovingSphere<M: Material> {
    center0: Vec3,
    center1: Vec3,
    time0: f32,
    time1: f32,
    radius: f32,
    material: M,
}

impl<M: Material> MovingSphere<M> {
    pub fn new(
        center0: Vec3,
        center1: Vec3,
        time0: f32,
        time1: f32,
        radius: f32,
        material: M,
    ) -> Self {
        Self {
            center0,
            center1,
            time0,
            time1,
            radius: radius.max(0.0),
            material,
        }
    }

    /// Center at `time`, extrapolated linearly outside the keyed interval.
    pub fn center(&self, time: f32) -> Vec3 {
        let span = self.time1 - self.time0;
        if span == 0.0 {
            return self.center0;
        }
        self.center0 + ((time - self.time0) / span) * (self.center1 - self.center0)
    }
}

impl<M: Material> Hittable for MovingSphere<M> {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        hit_sphere(self.center(ray.time()), self.radius, &self.material, ray, ray_t)
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Aabb {
        let rvec = Vec3::splat(self.radius);
        let c0 = self.center(time0);
        let c1 = self.center(time1);
        Aabb::surrounding(
            &Aabb::from_points(c0 - rvec, c0 + rvec),
            &Aabb::from_points(c1 - rvec, c1 + rvec),
        )
    }
}
