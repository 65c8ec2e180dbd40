//! mcrt renderer - CPU Monte Carlo path tracing.
//!
//! Radiance is estimated by following random light paths from the camera.
//! Diffuse bounces importance-sample an equal mixture of directions toward
//! the scene's lights and the surface's own scattering lobe; specular
//! bounces follow the mirror or refraction ray directly.
//!
//! Work is split into image buckets rendered in parallel. Each bucket owns
//! its random generator, so a given seed always produces the same image.

mod bucket;
mod bvh;
mod camera;
mod hittable;
mod material;
mod pdf;
pub mod random;
mod rect;
mod renderer;
mod scene;
mod sphere;
mod texture;
mod transform;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{BvhError, BvhNode, BvhResult};
pub use camera::Camera;
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{
    reflect, refract, Color, Dielectric, DiffuseLight, Lambertian, Lobe, Material, Metal,
    NoMaterial, ScatterRecord,
};
pub use pdf::{CosinePdf, HittablePdf, MixturePdf, Pdf};
pub use random::gen_f32;
pub use rect::{AaRect, Plane};
pub use renderer::{
    color_to_rgb, de_nan, linear_to_gamma, ray_color, render, render_pixel, ImageBuffer,
    RenderConfig, T_MIN,
};
pub use scene::{
    build_model, cornell_box, cornell_camera, cornell_glass, import_model, make_box,
    material_from_preset, mirror_box, ImportedModel, Scene, SceneDescription, SceneError,
    SceneResult,
};
pub use sphere::{MovingSphere, Sphere};
pub use texture::{ImageTexture, SolidColor, Texture, TextureError, TextureResult};
pub use transform::{FlipFace, Translate};
pub use triangle::Triangle;

/// Re-export Vec3 and common math types from mcrt_math
pub use mcrt_math::{Aabb, Interval, Ray, Vec3};
