//! Writing rendered images to disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use mcrt_renderer::ImageBuffer;

/// Save the image, picking the format from the file extension.
///
/// `.ppm` is written as plain-text P3; anything else goes through the
/// `image` crate.
pub fn save(image: &ImageBuffer, path: &Path) -> Result<()> {
    let is_ppm = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));

    if is_ppm {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_ppm(image, &mut BufWriter::new(file))
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
        let rgb = image::RgbImage::from_raw(image.width, image.height, image.to_rgb8())
            .context("Pixel buffer does not match image size")?;
        rgb.save(path)
            .with_context(|| format!("Failed to save {}", path.display()))?;
    }

    log::info!("Wrote {}", path.display());
    Ok(())
}

/// Plain PPM (P3), top row first.
pub fn write_ppm(image: &ImageBuffer, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "P3\n{} {}\n255", image.width, image.height)?;
    for row in image.to_rgb8().chunks(3 * image.width.max(1) as usize) {
        for rgb in row.chunks(3) {
            writeln!(out, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcrt_renderer::Color;

    fn two_by_one() -> ImageBuffer {
        let mut image = ImageBuffer::new(2, 1);
        image.set(0, 0, Color::new(1.0, 0.0, 0.25));
        image.set(1, 0, Color::new(4.0, f32::NAN, -1.0));
        image
    }

    #[test]
    fn test_write_ppm() {
        let mut bytes = Vec::new();
        write_ppm(&two_by_one(), &mut bytes).unwrap();

        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "P3\n2 1\n255\n255 0 127\n255 0 0\n");
    }

    #[test]
    fn test_save_png_round_trip() {
        let path = std::env::temp_dir().join(format!("mcrt_output_{}.png", std::process::id()));
        save(&two_by_one(), &path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.dimensions(), (2, 1));
        assert_eq!(loaded.get_pixel(0, 0).0, [255, 0, 127]);

        std::fs::remove_file(&path).unwrap();
    }
}
