//! Wavefront OBJ import.
//!
//! Converts every model of an OBJ file into a [`Mesh`] with one normal per
//! vertex. Materials referenced by the file are ignored; the scene assigns
//! a material per imported model.

use std::io::BufRead;
use std::path::Path;

use mcrt_math::Vec3;
use thiserror::Error;

use crate::mesh::Mesh;

/// Errors that can occur while importing geometry.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OBJ error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("No triangles found in {0}")]
    NoGeometry(String),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    }
}

/// Load all meshes of an OBJ file.
pub fn load_obj(path: impl AsRef<Path>) -> LoadResult<Vec<Mesh>> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(path, &load_options())?;
    let meshes = convert_models(models, &path.display().to_string())?;

    log::info!(
        "Loaded {} meshes ({} triangles) from {}",
        meshes.len(),
        meshes.iter().map(Mesh::triangle_count).sum::<usize>(),
        path.display()
    );

    Ok(meshes)
}

/// Load meshes from OBJ text. `mtllib` statements are not followed.
pub fn load_obj_from_reader(reader: &mut impl BufRead, source: &str) -> LoadResult<Vec<Mesh>> {
    let (models, _materials) =
        tobj::load_obj_buf(reader, &load_options(), |_| Err(tobj::LoadError::OpenFileFailed))?;
    convert_models(models, source)
}

fn convert_models(models: Vec<tobj::Model>, source: &str) -> LoadResult<Vec<Mesh>> {
    let meshes: Vec<Mesh> = models
        .into_iter()
        .filter(|model| !model.mesh.indices.is_empty())
        .map(convert_model)
        .collect();

    if meshes.is_empty() {
        return Err(LoadError::NoGeometry(source.to_string()));
    }

    Ok(meshes)
}

fn to_vec3s(flat: &[f32]) -> Vec<Vec3> {
    flat.chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect()
}

fn convert_model(model: tobj::Model) -> Mesh {
    let positions = to_vec3s(&model.mesh.positions);
    let normals = if model.mesh.normals.is_empty() {
        log::warn!("Mesh {} has no normals, computing smooth normals", model.name);
        None
    } else {
        // Imported normals are used as-is apart from normalization
        Some(
            to_vec3s(&model.mesh.normals)
                .into_iter()
                .map(|n| n.normalize_or_zero())
                .collect(),
        )
    };

    let mut mesh = Mesh::new(model.name, positions, model.mesh.indices, normals);
    mesh.ensure_normals();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TETRA_NO_NORMALS: &str = "\
o tetra
v 0 0 0
v 1 0 0
v 0 1 0
v 0 0 1
f 1 3 2
f 1 2 4
f 1 4 3
f 2 3 4
";

    const QUAD_WITH_NORMALS: &str = "\
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 2
f 1//1 2//1 3//1 4//1
";

    #[test]
    fn test_load_obj_computes_missing_normals() {
        let meshes = load_obj_from_reader(&mut Cursor::new(TETRA_NO_NORMALS), "tetra").unwrap();

        assert_eq!(meshes.len(), 1);
        let mesh = &meshes[0];
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.normals.as_ref().unwrap().len(), mesh.vertex_count());
    }

    #[test]
    fn test_load_obj_triangulates_and_normalizes() {
        let meshes = load_obj_from_reader(&mut Cursor::new(QUAD_WITH_NORMALS), "quad").unwrap();
        let mesh = &meshes[0];

        assert_eq!(mesh.triangle_count(), 2);
        for normal in mesh.normals.as_ref().unwrap() {
            assert!((*normal - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_load_obj_without_faces_is_an_error() {
        let result = load_obj_from_reader(&mut Cursor::new("v 0 0 0\nv 1 0 0\n"), "points");
        assert!(result.is_err());
    }
}
