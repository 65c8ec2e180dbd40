//! Textures: spatially varying colors looked up by surface coordinates.

use std::path::Path;

use crate::Color;
use mcrt_math::Vec3;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Texture {0} has no pixels")]
    Empty(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A color lookup at surface coordinates `(u, v)` and point `p`.
pub trait Texture: Send + Sync {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// The same color everywhere.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.color
    }
}

/// An 8-bit RGB image sampled with nearest-texel lookup.
///
/// `v = 0` is the bottom row of the image.
#[derive(Debug, Clone)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
}

impl ImageTexture {
    /// Load an image from disk (any format the `image` crate decodes).
    pub fn open(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let image = image::open(path)?.to_rgb8();
        if image.width() == 0 || image.height() == 0 {
            return Err(TextureError::Empty(path.display().to_string()));
        }

        log::info!(
            "Loaded texture {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self::from_rgb_image(&image))
    }

    pub fn from_rgb_image(image: &image::RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.pixels().map(|p| p.0).collect(),
        }
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        if self.pixels.is_empty() {
            return Color::new(0.0, 1.0, 1.0);
        }

        let nx = self.width as i64;
        let ny = self.height as i64;
        let i = ((u * nx as f32) as i64).clamp(0, nx - 1);
        let j = (((1.0 - v) * ny as f32 - 0.001) as i64).clamp(0, ny - 1);

        let [r, g, b] = self.pixels[(j * nx + i) as usize];
        Color::new(r as f32, g as f32, b as f32) / 255.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_color() {
        let texture = SolidColor::new(Color::new(0.65, 0.05, 0.05));
        assert_eq!(texture.value(0.3, 0.9, Vec3::ONE), Color::new(0.65, 0.05, 0.05));
    }

    #[test]
    fn test_image_texture_orientation_and_clamping() {
        // 2x2: top row red/green, bottom row blue/white
        let image = image::RgbImage::from_fn(2, 2, |x, y| match (x, y) {
            (0, 0) => image::Rgb([255, 0, 0]),
            (1, 0) => image::Rgb([0, 255, 0]),
            (0, 1) => image::Rgb([0, 0, 255]),
            _ => image::Rgb([255, 255, 255]),
        });
        let texture = ImageTexture::from_rgb_image(&image);

        // v = 1 is the top of the image
        assert_eq!(texture.value(0.25, 0.75, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(texture.value(0.75, 0.75, Vec3::ZERO), Color::new(0.0, 1.0, 0.0));
        assert_eq!(texture.value(0.25, 0.25, Vec3::ZERO), Color::new(0.0, 0.0, 1.0));

        // Out of range coordinates clamp to the border texels
        assert_eq!(texture.value(7.0, -3.0, Vec3::ZERO), Color::ONE);
        assert_eq!(texture.value(-1.0, 2.0, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
    }
}
