//! # I/O Module
//!
//! File readers for the two inputs of the viewer: an NRRD scan and a folder of
//! legacy VTK surface meshes.

pub mod nrrd;
pub mod vtk;

use std::path::Path;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::geometry::SurfaceMesh;

pub use nrrd::load_volume;
pub use vtk::load_surface;

/// File name suffix of the surfaces picked up by [`load_mesh_folder`]
pub const SURFACE_SUFFIX: &str = ".vtk";

/// A loaded surface paired with its display name (the file name)
#[derive(Debug, Clone)]
pub struct NamedSurface {
    pub name: String,
    pub mesh: SurfaceMesh,
}

/// Loads every `.vtk` file directly inside `dir`.
///
/// Entries are sorted by file name so the resulting order, and with it the
/// colour each surface receives, is the same on every platform. Other entries
/// are skipped. A `.vtk` file whose contents cannot be parsed becomes an empty
/// surface; failing to read the directory or a file is an error.
pub fn load_mesh_folder(dir: impl AsRef<Path>) -> Result<Vec<NamedSurface>> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir).map_err(|e| Error::read(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::read(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(SURFACE_SUFFIX) {
            debug!("skipping {name}");
            continue;
        }
        if !entry.path().is_file() {
            continue;
        }
        files.push((name, entry.path()));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut surfaces = Vec::with_capacity(files.len());
    for (name, path) in files {
        let mesh = match load_surface(&path) {
            Ok(mesh) => mesh,
            Err(Error::Vtk(reason)) => {
                warn!("{name} is not a readable surface ({reason}), keeping it empty");
                SurfaceMesh::default()
            }
            Err(e) => return Err(e),
        };
        debug!(
            "loaded {name}: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        surfaces.push(NamedSurface { name, mesh });
    }

    info!("Loaded {} surfaces from {}", surfaces.len(), dir.display());
    Ok(surfaces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const TRIANGLE: &str = "# vtk DataFile Version 3.0
triangle
ASCII
DATASET POLYDATA
POINTS 3 float
0 0 0 1 0 0 0 1 0
POLYGONS 1 4
3 0 1 2
";

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ucho-io-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_only_vtk_files_are_loaded_in_name_order() {
        let dir = scratch_dir("filter");
        for name in ["cochlea.vtk", "anvil.vtk", "stapes.vtk"] {
            fs::write(dir.join(name), TRIANGLE).unwrap();
        }
        fs::write(dir.join("notes.txt"), "not a mesh").unwrap();
        fs::write(dir.join("readme.txt"), "still not a mesh").unwrap();
        fs::create_dir_all(dir.join("nested.vtk")).unwrap();

        let surfaces = load_mesh_folder(&dir).unwrap();
        let names: Vec<&str> = surfaces.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["anvil.vtk", "cochlea.vtk", "stapes.vtk"]);
        assert!(surfaces.iter().all(|s| s.mesh.triangle_count() == 1));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let err = load_mesh_folder("/definitely/not/a/mesh/dir").unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn test_malformed_mesh_becomes_an_empty_surface() {
        let dir = scratch_dir("malformed");
        fs::write(dir.join("good.vtk"), TRIANGLE).unwrap();
        fs::write(dir.join("zz_bad.vtk"), "garbage").unwrap();

        let surfaces = load_mesh_folder(&dir).unwrap();
        assert_eq!(surfaces.len(), 2);
        assert_eq!(surfaces[0].mesh.triangle_count(), 1);
        assert_eq!(surfaces[1].name, "zz_bad.vtk");
        assert!(surfaces[1].mesh.is_empty());
        assert_eq!(surfaces[1].mesh.vertex_count(), 0);

        fs::remove_dir_all(&dir).unwrap();
    }
}
