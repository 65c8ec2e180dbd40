//! Direction sampling distributions used for importance sampling.
//!
//! A [`Pdf`] both draws directions and reports the density of any given
//! direction. `value` must describe exactly the distribution `generate`
//! samples from, otherwise the estimator is biased.

use crate::{gen_f32, random::random_cosine_direction, Hittable};
use mcrt_math::{Onb, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A probability density over directions.
pub trait Pdf {
    /// Density (per unit solid angle) of sampling `direction`.
    fn value(&self, direction: Vec3) -> f32;

    /// Draw a direction. Not necessarily normalized.
    fn generate(&self, rng: &mut dyn RngCore) -> Vec3;
}

/// Cosine-weighted hemisphere around a surface normal.
#[derive(Debug, Clone, Copy)]
pub struct CosinePdf {
    uvw: Onb,
}

impl CosinePdf {
    pub fn new(normal: Vec3) -> Self {
        Self {
            uvw: Onb::build_from_w(normal),
        }
    }
}

impl Pdf for CosinePdf {
    fn value(&self, direction: Vec3) -> f32 {
        let cosine = direction.normalize().dot(self.uvw.w());
        cosine.max(0.0) / PI
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.uvw.local(random_cosine_direction(rng))
    }
}

/// Directions from `origin` toward a target shape (usually the lights).
pub struct HittablePdf<'a> {
    target: &'a dyn Hittable,
    origin: Vec3,
}

impl<'a> HittablePdf<'a> {
    pub fn new(target: &'a dyn Hittable, origin: Vec3) -> Self {
        Self { target, origin }
    }
}

impl Pdf for HittablePdf<'_> {
    fn value(&self, direction: Vec3) -> f32 {
        self.target.pdf_value(self.origin, direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.target.random(self.origin, rng)
    }
}

/// Equal-weight mixture of two distributions.
///
/// Borrows both halves; it is built per bounce and dropped right after.
pub struct MixturePdf<'a> {
    p: [&'a dyn Pdf; 2],
}

impl<'a> MixturePdf<'a> {
    pub fn new(p0: &'a dyn Pdf, p1: &'a dyn Pdf) -> Self {
        Self { p: [p0, p1] }
    }
}

impl Pdf for MixturePdf<'_> {
    fn value(&self, direction: Vec3) -> f32 {
        0.5 * self.p[0].value(direction) + 0.5 * self.p[1].value(direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        if gen_f32(rng) < 0.5 {
            self.p[0].generate(rng)
        } else {
            self.p[1].generate(rng)
        }
    }
}
