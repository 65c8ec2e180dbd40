//! mcrt core - scene input for the path tracer.
//!
//! This crate provides:
//!
//! - **Meshes**: indexed triangle geometry with per-vertex shading normals
//! - **OBJ import**: Wavefront OBJ files converted to meshes
//! - **Settings**: JSON render settings and scene description
//!
//! # Example
//!
//! ```ignore
//! use mcrt_core::{load_obj, RenderSettings};
//!
//! let settings = RenderSettings::from_file("cornell.json")?;
//! for model in &settings.models {
//!     let meshes = load_obj(&model.path)?;
//!     println!("{} meshes", meshes.len());
//! }
//! ```

pub mod mesh;
pub mod obj;
pub mod settings;

// Re-export commonly used types
pub use mesh::{Mesh, Vertex};
pub use obj::{load_obj, load_obj_from_reader, LoadError, LoadResult};
pub use settings::{
    MaterialPreset, ModelSpec, RenderSettings, ScenePreset, SettingsError, SettingsResult,
};
