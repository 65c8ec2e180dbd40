//! Built-in scenes and assembly of imported models into a renderable scene.
//!
//! A scene is the world (behind a BVH) plus an optional light shape used
//! for importance sampling. Light shapes are geometry-only copies of the
//! emitters carrying [`NoMaterial`].

use std::sync::Arc;

use crate::{
    AaRect, BvhError, BvhNode, Camera, Color, Dielectric, DiffuseLight, FlipFace, Hittable,
    HittableList, ImageTexture, Lambertian, Material, Metal, NoMaterial, Plane, Sphere,
    TextureError, Translate, Triangle,
};
use mcrt_core::{load_obj, LoadError, MaterialPreset, Mesh, ModelSpec, RenderSettings, ScenePreset};
use mcrt_math::Vec3;
use thiserror::Error;

/// Errors that can occur while assembling a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("BVH error: {0}")]
    Bvh(#[from] BvhError),

    #[error("Light shape has no primitives to sample")]
    EmptyLights,

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("Model import error: {0}")]
    Load(#[from] LoadError),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Edge length of the Cornell room.
const ROOM: f32 = 555.0;

/// A renderable scene.
pub struct Scene {
    world: BvhNode,
    lights: Option<HittableList>,
}

impl Scene {
    /// Build the world BVH over `objects` (shutter `[0, 1]`).
    ///
    /// `lights`, when given, must contain at least one shape.
    pub fn new(objects: HittableList, lights: Option<HittableList>) -> SceneResult<Self> {
        if lights.as_ref().is_some_and(HittableList::is_empty) {
            return Err(SceneError::EmptyLights);
        }

        let world = BvhNode::new(objects.into_objects(), 0.0, 1.0)?;
        Ok(Self { world, lights })
    }

    /// Assemble the preset named in `settings` plus its imported models.
    pub fn from_settings(settings: &RenderSettings) -> SceneResult<Self> {
        let mut description = match settings.scene {
            ScenePreset::CornellBox => cornell_box(),
            ScenePreset::CornellGlass => cornell_glass(),
            ScenePreset::MirrorBox => mirror_box(),
        };

        for model in &settings.models {
            description.add_model(import_model(model)?);
        }

        description.build()
    }

    pub fn world(&self) -> &dyn Hittable {
        &self.world
    }

    pub fn lights(&self) -> Option<&dyn Hittable> {
        self.lights.as_ref().map(|lights| lights as &dyn Hittable)
    }
}

/// Scene contents before the BVH is built.
#[derive(Default)]
pub struct SceneDescription {
    pub objects: HittableList,
    pub lights: HittableList,
}

impl SceneDescription {
    pub fn add_model(&mut self, model: ImportedModel) {
        self.objects.add(model.object);
        if let Some(light) = model.light {
            self.lights.add(light);
        }
    }

    /// Build the scene. Without any light shape the integrator falls back to
    /// material sampling alone.
    pub fn build(self) -> SceneResult<Scene> {
        let lights = if self.lights.is_empty() {
            log::warn!("Scene has no light shapes, diffuse bounces will not sample lights");
            None
        } else {
            Some(self.lights)
        };
        Scene::new(self.objects, lights)
    }
}

/// The camera all built-in scenes are framed for.
pub fn cornell_camera(width: u32, height: u32) -> Camera {
    let mut camera = Camera::new()
        .with_resolution(width, height)
        .with_position(
            Vec3::new(278.0, 278.0, -800.0),
            Vec3::new(278.0, 278.0, 0.0),
            Vec3::Y,
        )
        .with_lens(40.0, 0.0, 10.0)
        .with_shutter(0.0, 1.0);
    camera.initialize();
    camera
}

/// Open-front room with a ceiling light. `left` is the wall at `x = 555`,
/// `right` the one at `x = 0`.
fn room(
    description: &mut SceneDescription,
    left: Arc<dyn Material>,
    right: Arc<dyn Material>,
    walls: Arc<dyn Material>,
) {
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(15.0)));
    let objects = &mut description.objects;

    objects.add(FlipFace::new(AaRect::new(Plane::Yz, 0.0, ROOM, 0.0, ROOM, ROOM, left)));
    objects.add(AaRect::new(Plane::Yz, 0.0, ROOM, 0.0, ROOM, 0.0, right));
    objects.add(FlipFace::new(AaRect::new(
        Plane::Xz,
        213.0,
        343.0,
        227.0,
        332.0,
        554.0,
        light,
    )));
    objects.add(FlipFace::new(AaRect::new(Plane::Xz, 0.0, ROOM, 0.0, ROOM, ROOM, walls.clone())));
    objects.add(AaRect::new(Plane::Xz, 0.0, ROOM, 0.0, ROOM, 0.0, walls.clone()));
    objects.add(FlipFace::new(AaRect::new(Plane::Xy, 0.0, ROOM, 0.0, ROOM, ROOM, walls)));

    description
        .lights
        .add(AaRect::new(Plane::Xz, 213.0, 343.0, 227.0, 332.0, 554.0, NoMaterial));
}

fn cornell_walls(description: &mut SceneDescription) -> Arc<dyn Material> {
    let red: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.65, 0.05, 0.05)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.73)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.12, 0.45, 0.15)));

    room(description, green, red, white.clone());
    white
}

/// Classic Cornell box with two white blocks.
pub fn cornell_box() -> SceneDescription {
    let mut description = SceneDescription::default();
    let white = cornell_walls(&mut description);

    description.objects.add(make_box(
        Vec3::new(130.0, 0.0, 65.0),
        Vec3::new(295.0, 165.0, 230.0),
        white.clone(),
    ));
    description.objects.add(make_box(
        Vec3::new(265.0, 0.0, 295.0),
        Vec3::new(430.0, 330.0, 460.0),
        white,
    ));

    description
}

/// Cornell box with a glass sphere and a metal block. The sphere is also a
/// light shape so caustics through it converge.
pub fn cornell_glass() -> SceneDescription {
    let mut description = SceneDescription::default();
    cornell_walls(&mut description);

    let sphere_center = Vec3::new(190.0, 90.0, 190.0);
    let aluminum: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.8, 0.85, 0.88), 0.0));

    description
        .objects
        .add(Sphere::new(sphere_center, 90.0, Dielectric::new(1.5)));
    description.objects.add(make_box(
        Vec3::new(265.0, 0.0, 295.0),
        Vec3::new(430.0, 330.0, 460.0),
        aluminum,
    ));
    description
        .lights
        .add(Sphere::new(sphere_center, 90.0, NoMaterial));

    description
}

/// Room where every wall is a perfect mirror, around a white sphere.
pub fn mirror_box() -> SceneDescription {
    let mut description = SceneDescription::default();
    let mirror: Arc<dyn Material> = Arc::new(Metal::new(Color::splat(0.9), 0.0));
    room(&mut description, mirror.clone(), mirror.clone(), mirror);

    description.objects.add(Sphere::new(
        Vec3::new(278.0, 120.0, 278.0),
        120.0,
        Lambertian::new(Color::splat(0.73)),
    ));

    description
}

/// Axis-aligned box from corner `p0` to corner `p1`, normals facing out.
pub fn make_box(p0: Vec3, p1: Vec3, material: Arc<dyn Material>) -> HittableList {
    let (lo, hi) = (p0.min(p1), p0.max(p1));
    let mut sides = HittableList::new();

    sides.add(AaRect::new(Plane::Xy, lo.x, hi.x, lo.y, hi.y, hi.z, material.clone()));
    sides.add(FlipFace::new(AaRect::new(Plane::Xy, lo.x, hi.x, lo.y, hi.y, lo.z, material.clone())));
    sides.add(AaRect::new(Plane::Xz, lo.x, hi.x, lo.z, hi.z, hi.y, material.clone()));
    sides.add(FlipFace::new(AaRect::new(Plane::Xz, lo.x, hi.x, lo.z, hi.z, lo.y, material.clone())));
    sides.add(AaRect::new(Plane::Yz, lo.y, hi.y, lo.z, hi.z, hi.x, material.clone()));
    sides.add(FlipFace::new(AaRect::new(Plane::Yz, lo.y, hi.y, lo.z, hi.z, lo.x, material)));

    sides
}

/// Instantiate a material preset.
pub fn material_from_preset(preset: &MaterialPreset) -> SceneResult<Arc<dyn Material>> {
    let material: Arc<dyn Material> = match preset {
        MaterialPreset::Diffuse { color } => Arc::new(Lambertian::new(Color::from_array(*color))),
        MaterialPreset::Textured { path } => {
            Arc::new(Lambertian::with_texture(Arc::new(ImageTexture::open(path)?)))
        }
        MaterialPreset::Metal { albedo, fuzz } => {
            Arc::new(Metal::new(Color::from_array(*albedo), *fuzz))
        }
        MaterialPreset::Glass { ior } => Arc::new(Dielectric::new(*ior)),
        MaterialPreset::Light { emission } => {
            Arc::new(DiffuseLight::new(Color::from_array(*emission)))
        }
    };
    Ok(material)
}

/// An imported model: its geometry and, for emissive presets, the matching
/// light shape.
pub struct ImportedModel {
    pub object: Translate<BvhNode>,
    pub light: Option<Translate<BvhNode>>,
}

/// Load an OBJ model and turn it into triangles with the model's material.
pub fn import_model(model: &ModelSpec) -> SceneResult<ImportedModel> {
    let meshes = load_obj(&model.path)?;
    build_model(&meshes, &model.material, model.offset())
}

/// Turn meshes into a translated BVH of triangles sharing one material.
pub fn build_model(
    meshes: &[Mesh],
    preset: &MaterialPreset,
    offset: Vec3,
) -> SceneResult<ImportedModel> {
    let material = material_from_preset(preset)?;
    let emissive = matches!(preset, MaterialPreset::Light { .. });

    let mut triangles: Vec<Box<dyn Hittable>> = Vec::new();
    let mut proxies: Vec<Box<dyn Hittable>> = Vec::new();
    for mesh in meshes {
        for vertices in mesh.triangles() {
            triangles.push(Box::new(Triangle::from_vertices(vertices, material.clone())));
            if emissive {
                proxies.push(Box::new(Triangle::from_vertices(vertices, NoMaterial)));
            }
        }
    }

    log::info!(
        "Imported {} triangles at offset {}",
        triangles.len(),
        offset
    );

    let object = Translate::new(BvhNode::new(triangles, 0.0, 1.0)?, offset);
    let light = if emissive {
        Some(Translate::new(BvhNode::new(proxies, 0.0, 1.0)?, offset))
    } else {
        None
    };

    Ok(ImportedModel { object, light })
}
