//! Material trait for surface scattering.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::{
    gen_f32, random::random_in_unit_sphere, CosinePdf, HitRecord, Pdf, Ray, SolidColor, Texture,
};
use mcrt_math::Vec3;
use rand::RngCore;

/// Color type alias (linear RGB, non-negative, not clamped)
pub type Color = Vec3;

/// How a scattered path continues.
pub enum Lobe {
    /// Deterministic continuation (mirror reflection or refraction).
    Specular(Ray),
    /// Continue by importance sampling this distribution. Owned by the
    /// caller and dropped once the next direction has been evaluated.
    Diffuse(Box<dyn Pdf>),
}

/// Result of a material's scatter decision.
pub struct ScatterRecord {
    /// Channel-wise throughput of the bounce
    pub attenuation: Color,
    pub lobe: Lobe,
}

impl ScatterRecord {
    pub fn specular(attenuation: Color, ray: Ray) -> Self {
        Self {
            attenuation,
            lobe: Lobe::Specular(ray),
        }
    }

    pub fn diffuse(attenuation: Color, pdf: impl Pdf + 'static) -> Self {
        Self {
            attenuation,
            lobe: Lobe::Diffuse(Box::new(pdf)),
        }
    }

    pub fn is_specular(&self) -> bool {
        matches!(self.lobe, Lobe::Specular(_))
    }
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray, or `None` if it is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord>;

    /// Density of the material's own scattering distribution for the
    /// `scattered` direction. Only meaningful for diffuse lobes.
    fn scattering_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f32 {
        0.0
    }

    /// Light emitted at the hit point toward the incoming ray.
    fn emitted(&self, _ray_in: &Ray, _rec: &HitRecord, _u: f32, _v: f32, _p: Vec3) -> Color {
        Color::ZERO
    }
}

impl<M: Material + ?Sized> Material for Arc<M> {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        (**self).scatter(ray_in, rec, rng)
    }

    fn scattering_pdf(&self, ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> f32 {
        (**self).scattering_pdf(ray_in, rec, scattered)
    }

    fn emitted(&self, ray_in: &Ray, rec: &HitRecord, u: f32, v: f32, p: Vec3) -> Color {
        (**self).emitted(ray_in, rec, u, v, p)
    }
}

/// Shape-only material for light-sampling proxies. Never scatters or emits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMaterial;

impl Material for NoMaterial {
    fn scatter(&self, _ray_in: &Ray, _rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        None
    }
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    /// Create a new Lambertian material with a constant albedo.
    pub fn new(albedo: Color) -> Self {
        Self::with_texture(Arc::new(SolidColor::new(albedo)))
    }

    pub fn with_texture(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let attenuation = self.albedo.value(rec.u, rec.v, rec.p);
        Some(ScatterRecord::diffuse(attenuation, CosinePdf::new(rec.normal)))
    }

    fn scattering_pdf(&self, _ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> f32 {
        let cosine = rec.normal.dot(scattered.direction().normalize());
        cosine.max(0.0) / PI
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone, Copy)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let direction = reflected + self.fuzz * random_in_unit_sphere(rng);

        Some(ScatterRecord::specular(
            self.albedo,
            Ray::new(rec.p, direction, ray_in.time()),
        ))
    }
}

/// Dielectric (glass) material. Non-absorbing.
#[derive(Debug, Clone, Copy)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }

    /// Probability of reflecting (rather than refracting) a ray travelling
    /// along `direction` into a surface with normal `normal`, together with
    /// the refracted direction when refraction is possible.
    ///
    /// Entering or leaving is decided by the sign of `direction · normal`.
    pub fn reflect_probability(&self, direction: Vec3, normal: Vec3) -> (f32, Option<Vec3>) {
        let d_dot_n = direction.dot(normal);
        let (outward_normal, ni_over_nt, cosine) = if d_dot_n > 0.0 {
            // Leaving the medium
            (-normal, self.ior, self.ior * d_dot_n / direction.length())
        } else {
            (normal, 1.0 / self.ior, -d_dot_n / direction.length())
        };

        match refract(direction, outward_normal, ni_over_nt) {
            Some(refracted) => (Self::reflectance(cosine, self.ior), Some(refracted)),
            // Total internal reflection
            None => (1.0, None),
        }
    }
}

impl Material for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let direction = ray_in.direction();
        let (reflect_prob, refracted) = self.reflect_probability(direction, rec.normal);

        let scattered = match refracted {
            Some(refracted) if gen_f32(rng) >= reflect_prob => refracted,
            _ => reflect(direction, rec.normal),
        };

        Some(ScatterRecord::specular(
            Color::ONE,
            Ray::new(rec.p, scattered, ray_in.time()),
        ))
    }
}

/// Diffuse light emitter. Emits only from the side its normal faces.
#[derive(Clone)]
pub struct DiffuseLight {
    emit: Arc<dyn Texture>,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self::with_texture(Arc::new(SolidColor::new(emit)))
    }

    pub fn with_texture(emit: Arc<dyn Texture>) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn scatter(&self, _ray_in: &Ray, _rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        None
    }

    fn emitted(&self, ray_in: &Ray, rec: &HitRecord, u: f32, v: f32, p: Vec3) -> Color {
        if rec.normal.dot(ray_in.direction()) < 0.0 {
            self.emit.value(u, v, p)
        } else {
            Color::ZERO
        }
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract `v` through a surface with normal `n` facing the incoming side.
///
/// Returns `None` under total internal reflection.
#[inline]
pub fn refract(v: Vec3, n: Vec3, ni_over_nt: f32) -> Option<Vec3> {
    let uv = v.normalize();
    let dt = uv.dot(n);
    let discriminant = 1.0 - ni_over_nt * ni_over_nt * (1.0 - dt * dt);
    if discriminant > 0.0 {
        Some(ni_over_nt * (uv - n * dt) - n * discriminant.sqrt())
    } else {
        None
    }
}
