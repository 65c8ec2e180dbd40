//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive radiance estimation bounded by a depth cap
//! - Light importance sampling mixed 50/50 with the material's own lobe
//! - Gamma correction
//! - Anti-aliasing via multi-sampling

use std::time::Instant;

use crate::bucket::{generate_buckets, render_bucket, BucketResult};
use crate::{Camera, Color, HitRecord, Hittable, HittablePdf, Lobe, MixturePdf, Pdf, Ray};
use mcrt_core::RenderSettings;
use mcrt_math::Interval;
use rand::RngCore;
use rayon::prelude::*;

/// Closest accepted hit distance, to avoid self-intersection ("acne").
pub const T_MIN: f32 = 0.001;

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Background color when ray doesn't hit anything
    pub background: Color,
    /// Base seed; every bucket derives its own stream from it
    pub seed: u64,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::ZERO,
            seed: 0,
            bucket_size: crate::DEFAULT_BUCKET_SIZE,
        }
    }
}

impl RenderConfig {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            samples_per_pixel: settings.samples_per_pixel,
            max_depth: settings.max_depth,
            seed: settings.seed,
            bucket_size: settings.bucket_size,
            ..Self::default()
        }
    }
}

/// Estimate the radiance arriving along `ray`.
///
/// `depth` counts bounces taken so far. When `lights` is given, diffuse
/// bounces sample an equal mixture of directions toward the lights and the
/// material's own distribution; otherwise the material's alone.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    lights: Option<&dyn Hittable>,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let Some(rec) = world.hit(ray, Interval::from_min(T_MIN)) else {
        return config.background;
    };

    let emitted = rec.material.emitted(ray, &rec, rec.u, rec.v, rec.p);
    if depth >= config.max_depth {
        return emitted;
    }

    let Some(srec) = rec.material.scatter(ray, &rec, rng) else {
        return emitted;
    };

    match srec.lobe {
        Lobe::Specular(specular) => {
            srec.attenuation * ray_color(&specular, world, lights, depth + 1, config, rng)
        }
        Lobe::Diffuse(material_pdf) => {
            let Some((scattered, pdf_value)) =
                sample_diffuse(ray, &rec, material_pdf.as_ref(), lights, rng)
            else {
                return emitted;
            };

            let scattering_pdf = rec.material.scattering_pdf(ray, &rec, &scattered);
            let incoming = ray_color(&scattered, world, lights, depth + 1, config, rng);
            emitted + srec.attenuation * scattering_pdf * incoming / pdf_value
        }
    }
}

/// Draw the next diffuse direction and its density. `None` when the drawn
/// direction has zero density under the sampling distribution.
fn sample_diffuse(
    ray: &Ray,
    rec: &HitRecord,
    material_pdf: &dyn Pdf,
    lights: Option<&dyn Hittable>,
    rng: &mut dyn RngCore,
) -> Option<(Ray, f32)> {
    let (direction, pdf_value) = match lights {
        Some(lights) => {
            let light_pdf = HittablePdf::new(lights, rec.p);
            let mixture = MixturePdf::new(&light_pdf, material_pdf);
            let direction = mixture.generate(rng);
            (direction, mixture.value(direction))
        }
        None => {
            let direction = material_pdf.generate(rng);
            (direction, material_pdf.value(direction))
        }
    };

    if pdf_value > 0.0 {
        Some((Ray::new(rec.p, direction, ray.time()), pdf_value))
    } else {
        None
    }
}

/// Replace NaN channels with zero. Infinities are left for the output clamp.
#[inline]
pub fn de_nan(color: Color) -> Color {
    Color::new(
        if color.x.is_nan() { 0.0 } else { color.x },
        if color.y.is_nan() { 0.0 } else { color.y },
        if color.z.is_nan() { 0.0 } else { color.z },
    )
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let to_byte = |c: f32| (255.99 * linear_to_gamma(c).clamp(0.0, 1.0)) as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z)]
}

/// Render a single pixel with multi-sampling.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    lights: Option<&dyn Hittable>,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = config.samples_per_pixel.max(1);
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        // Camera.get_ray already adds random offset for anti-aliasing
        let ray = camera.get_ray(x, y, rng);
        pixel_color += de_nan(ray_color(&ray, world, lights, 0, config, rng));
    }

    // Average the samples
    pixel_color / samples as f32
}

/// Linear-color image, row-major with row 0 at the top.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a finished bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            self.set(bucket.x + local_x, bucket.y + local_y, *color);
        }
    }

    /// Gamma-corrected 8-bit RGB bytes, top row first.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|color| color_to_rgb(*color))
            .collect()
    }
}

/// Render the entire scene to an image buffer.
///
/// Buckets are rendered in parallel, each with its own generator seeded
/// from `config.seed` and the bucket index, so output does not depend on
/// thread scheduling.
pub fn render(
    camera: &Camera,
    world: &dyn Hittable,
    lights: Option<&dyn Hittable>,
    config: &RenderConfig,
) -> ImageBuffer {
    let width = camera.image_width;
    let height = camera.image_height;
    let buckets = generate_buckets(width, height, config.bucket_size);

    log::info!(
        "Rendering {}x{} at {} spp, {} buckets on {} threads",
        width,
        height,
        config.samples_per_pixel,
        buckets.len(),
        rayon::current_num_threads()
    );
    let start = Instant::now();

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| render_bucket(bucket, camera, world, lights, config))
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}
