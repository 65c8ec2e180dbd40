//! Render settings and scene description loaded from JSON.
//!
//! Every field has a default, so a settings file only needs to list what it
//! changes:
//!
//! ```json
//! {
//!   "width": 300,
//!   "height": 300,
//!   "samples_per_pixel": 500,
//!   "scene": "cornell_glass",
//!   "models": [
//!     { "path": "resources/sphere.obj", "offset": [200, 100, 200],
//!       "material": { "type": "glass", "ior": 1.5 } }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use mcrt_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while reading settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Built-in scene layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScenePreset {
    /// Empty Cornell box: white cavity, red and green side walls, ceiling light
    CornellBox,
    /// Cornell box with a glass sphere and a metal block
    #[default]
    CornellGlass,
    /// Cornell frame where every wall is a mirror, around a white sphere
    MirrorBox,
}

/// Material assigned to an imported model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialPreset {
    Diffuse { color: [f32; 3] },
    /// Diffuse with the albedo read from an image at each hit's (u, v)
    Textured { path: PathBuf },
    Metal { albedo: [f32; 3], fuzz: f32 },
    Glass { ior: f32 },
    Light { emission: [f32; 3] },
}

impl Default for MaterialPreset {
    fn default() -> Self {
        MaterialPreset::Diffuse {
            color: [0.73, 0.73, 0.73],
        }
    }
}

/// An OBJ model placed into the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub path: PathBuf,
    #[serde(default)]
    pub material: MaterialPreset,
    /// Translation applied to the whole model
    #[serde(default)]
    pub offset: [f32; 3],
}

impl ModelSpec {
    pub fn offset(&self) -> Vec3 {
        Vec3::from_array(self.offset)
    }
}

/// Everything the renderer needs besides the geometry itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    /// Bounce depth at which paths stop scattering
    pub max_depth: u32,
    /// Base seed; each bucket derives its own generator from it
    pub seed: u64,
    pub bucket_size: u32,
    pub scene: ScenePreset,
    pub models: Vec<ModelSpec>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            samples_per_pixel: 100,
            max_depth: 50,
            seed: 0,
            bucket_size: 32,
            scene: ScenePreset::default(),
            models: Vec::new(),
        }
    }
}

impl RenderSettings {
    /// Parse settings from a JSON string and validate them.
    pub fn from_json(json: &str) -> SettingsResult<Self> {
        let settings: RenderSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file.
    ///
    /// Relative model and texture paths are resolved against the file's
    /// directory.
    pub fn from_file(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut settings = Self::from_json(&json)?;
        if let Some(dir) = path.parent() {
            for model in &mut settings.models {
                if model.path.is_relative() {
                    model.path = dir.join(&model.path);
                }
                if let MaterialPreset::Textured { path } = &mut model.material {
                    if path.is_relative() {
                        *path = dir.join(&*path);
                    }
                }
            }
        }

        log::info!("Loaded render settings from {}", path.display());
        Ok(settings)
    }

    /// Reject settings that cannot produce an image.
    pub fn validate(&self) -> SettingsResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SettingsError::Invalid(format!(
                "image size {}x{} is empty",
                self.width, self.height
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(SettingsError::Invalid("samples_per_pixel must be at least 1".into()));
        }
        if self.bucket_size == 0 {
            return Err(SettingsError::Invalid("bucket_size must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let settings = RenderSettings::from_json("{}").unwrap();
        assert_eq!(settings, RenderSettings::default());
        assert_eq!(settings.max_depth, 50);
    }

    #[test]
    fn test_models_and_materials() {
        let json = r#"{
            "width": 64,
            "scene": "mirror_box",
            "models": [
                { "path": "sphere.obj", "offset": [200, 100, 200],
                  "material": { "type": "glass", "ior": 1.5 } },
                { "path": "cylinder.obj",
                  "material": { "type": "metal", "albedo": [0.7, 0.6, 0.5], "fuzz": 1.0 } },
                { "path": "plain.obj" }
            ]
        }"#;
        let settings = RenderSettings::from_json(json).unwrap();

        assert_eq!(settings.width, 64);
        assert_eq!(settings.height, 500);
        assert_eq!(settings.scene, ScenePreset::MirrorBox);
        assert_eq!(settings.models.len(), 3);
        assert_eq!(settings.models[0].material, MaterialPreset::Glass { ior: 1.5 });
        assert_eq!(settings.models[0].offset(), Vec3::new(200.0, 100.0, 200.0));
        assert_eq!(settings.models[1].offset(), Vec3::ZERO);
        assert_eq!(settings.models[2].material, MaterialPreset::default());
    }

    #[test]
    fn test_from_file_resolves_relative_paths() {
        let dir = std::env::temp_dir().join(format!("mcrt_settings_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("scene.json");
        std::fs::write(
            &file,
            r#"{ "models": [ { "path": "bunny.obj",
                 "material": { "type": "textured", "path": "maps/fur.png" } } ] }"#,
        )
        .unwrap();

        let settings = RenderSettings::from_file(&file).unwrap();
        assert_eq!(settings.models[0].path, dir.join("bunny.obj"));
        assert_eq!(
            settings.models[0].material,
            MaterialPreset::Textured {
                path: dir.join("maps/fur.png")
            }
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = RenderSettings::from_file("/nonexistent/mcrt/settings.json");
        assert!(matches!(result, Err(SettingsError::Io { .. })));
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        assert!(matches!(
            RenderSettings::from_json(r#"{ "samples_per_pixel": 0 }"#),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(
            RenderSettings::from_json(r#"{ "scene": "teapot" }"#),
            Err(SettingsError::Json(_))
        ));
    }
}
