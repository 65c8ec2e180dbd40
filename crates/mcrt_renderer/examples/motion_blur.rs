//! Moving spheres lit by a spherical lamp, written to `motion_blur.png`.
//!
//! Shows the renderer used as a library: hand-built geometry, a light
//! shape for importance sampling, and the camera shutter.

use mcrt_renderer::{
    render, BvhNode, Camera, Color, DiffuseLight, Hittable, HittableList, Lambertian,
    MovingSphere, NoMaterial, RenderConfig, Sphere, Vec3,
};

fn main() {
    let lamp_center = Vec3::new(0.0, 7.0, 0.0);

    let mut objects: Vec<Box<dyn Hittable>> = vec![
        // Ground
        Box::new(Sphere::new(
            Vec3::new(0.0, -1000.0, 0.0),
            1000.0,
            Lambertian::new(Color::new(0.5, 0.5, 0.5)),
        )),
        Box::new(Sphere::new(lamp_center, 1.5, DiffuseLight::new(Color::splat(20.0)))),
    ];

    for i in 0..5 {
        let x = -4.0 + 2.0 * i as f32;
        let start = Vec3::new(x, 0.5, 0.0);
        objects.push(Box::new(MovingSphere::new(
            start,
            start + Vec3::new(0.0, 0.1 * i as f32, 0.0),
            0.0,
            1.0,
            0.5,
            Lambertian::new(Color::new(0.2 * i as f32, 0.3, 0.8 - 0.15 * i as f32)),
        )));
    }

    let world = BvhNode::new(objects, 0.0, 1.0).expect("scene has primitives");

    let mut lights = HittableList::new();
    lights.add(Sphere::new(lamp_center, 1.5, NoMaterial));

    let mut camera = Camera::new()
        .with_resolution(400, 225)
        .with_position(Vec3::new(0.0, 2.0, 10.0), Vec3::new(0.0, 0.5, 0.0), Vec3::Y)
        .with_lens(30.0, 0.0, 10.0)
        .with_shutter(0.0, 1.0);
    camera.initialize();

    let config = RenderConfig {
        samples_per_pixel: 64,
        max_depth: 10,
        background: Color::new(0.05, 0.05, 0.08),
        ..RenderConfig::default()
    };

    let start = std::time::Instant::now();
    let image = render(&camera, &world, Some(&lights), &config);
    println!("Rendered in {:?}", start.elapsed());

    let rgb = image::RgbImage::from_raw(image.width, image.height, image.to_rgb8())
        .expect("buffer matches image size");
    rgb.save("motion_blur.png").expect("Failed to save image");
    println!("Saved to motion_blur.png");
}
