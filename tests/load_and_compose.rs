//! Loads NRRD / VTK files from disk and composes a scene from them, the same
//! path the binary takes before any window opens.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::{write::GzEncoder, Compression};
use winit::keyboard::{Key, NamedKey};

use ucho::{
    io,
    scene::{build_actors, palette, Orientation, StepPolicy, ViewerScene},
    ui::{apply_slider, opacity_panel::slider_values},
    volume::{window_level::WindowLevel, Extent},
    Error,
};

const TRIANGLE: &str = "# vtk DataFile Version 3.0
surface
ASCII
DATASET POLYDATA
POINTS 3 float
10 10 10 40 10 10 10 40 10
POLYGONS 1 4
3 0 1 2
";

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ucho-it-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Writes a gzip-encoded unsigned char volume of the given size.
fn write_volume(path: &Path, sizes: [usize; 3]) {
    let count = sizes.iter().product::<usize>();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(&vec![0u8; count]).unwrap();
    let payload = encoder.finish().unwrap();

    let mut bytes = format!(
        "NRRD0004\n# written by the integration tests\ntype: uchar\ndimension: 3\n\
         sizes: {} {} {}\nspacings: 0.1 0.1 0.1\nencoding: gzip\n\n",
        sizes[0], sizes[1], sizes[2]
    )
    .into_bytes();
    bytes.extend_from_slice(&payload);
    fs::write(path, bytes).unwrap();
}

fn compose(dir: &Path, mesh_dir: &Path, policy: StepPolicy) -> ViewerScene {
    let volume = io::load_volume(dir.join("scan.nrrd")).unwrap();
    let surfaces = io::load_mesh_folder(mesh_dir).unwrap();
    let actors = build_actors(surfaces, 0.8);
    ViewerScene::new(volume, actors, WindowLevel::default(), policy)
}

#[test]
fn test_scan_with_two_meshes() {
    let dir = scratch_dir("two-meshes");
    let mesh_dir = dir.join("models");
    fs::create_dir_all(&mesh_dir).unwrap();
    write_volume(&dir.join("scan.nrrd"), [256, 256, 200]);
    fs::write(mesh_dir.join("cochlea.vtk"), TRIANGLE).unwrap();
    fs::write(mesh_dir.join("vestibule.vtk"), TRIANGLE).unwrap();

    let scene = compose(&dir, &mesh_dir, StepPolicy::Clamped);

    assert_eq!(scene.volume().extent(), Extent::new(0, 255, 0, 255, 0, 199));
    assert_eq!(scene.actors.len(), 2);
    assert_eq!(scene.actors[0].color(), palette::TOMATO);
    assert_eq!(scene.actors[1].color(), palette::BANANA);
    assert_eq!(scene.plane(Orientation::Sagittal).slab(), (127, 127));
    assert_eq!(scene.plane(Orientation::Coronal).slab(), (127, 127));
    assert_eq!(scene.plane(Orientation::Axial).slab(), (99, 99));
    assert_eq!(slider_values(&scene.actors), vec![8, 8]);
    for plane in scene.planes() {
        assert_eq!(plane.window_level(), WindowLevel::default());
    }

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_only_vtk_files_become_actors() {
    let dir = scratch_dir("mixed-folder");
    let mesh_dir = dir.join("models");
    fs::create_dir_all(&mesh_dir).unwrap();
    write_volume(&dir.join("scan.nrrd"), [8, 8, 8]);
    for name in ["a.vtk", "b.vtk", "c.vtk"] {
        fs::write(mesh_dir.join(name), TRIANGLE).unwrap();
    }
    fs::write(mesh_dir.join("notes.txt"), "segmentation notes").unwrap();
    fs::write(mesh_dir.join("labels.txt"), "1 cochlea\n2 nerve\n").unwrap();

    let scene = compose(&dir, &mesh_dir, StepPolicy::Clamped);
    assert_eq!(scene.actors.len(), 3);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_unreadable_mesh_still_gets_a_slider() {
    let dir = scratch_dir("unreadable-mesh");
    let mesh_dir = dir.join("models");
    fs::create_dir_all(&mesh_dir).unwrap();
    write_volume(&dir.join("scan.nrrd"), [8, 8, 8]);
    fs::write(mesh_dir.join("cochlea.vtk"), TRIANGLE).unwrap();
    fs::write(mesh_dir.join("nerve.vtk"), "garbage").unwrap();

    let scene = compose(&dir, &mesh_dir, StepPolicy::Clamped);
    assert_eq!(scene.actors.len(), 2);
    assert_eq!(scene.actors[1].name(), "nerve.vtk");
    assert_eq!(scene.actors[1].color(), palette::BANANA);
    assert!(scene.actors[1].mesh().is_empty());
    assert_eq!(slider_values(&scene.actors), vec![8, 8]);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_keys_and_sliders_edit_the_scene() {
    let dir = scratch_dir("interaction");
    let mesh_dir = dir.join("models");
    fs::create_dir_all(&mesh_dir).unwrap();
    write_volume(&dir.join("scan.nrrd"), [10, 10, 10]);
    fs::write(mesh_dir.join("cochlea.vtk"), TRIANGLE).unwrap();

    let mut scene = compose(&dir, &mesh_dir, StepPolicy::Unbounded);
    for _ in 0..7 {
        scene.apply_key(&Key::Named(NamedKey::ArrowRight));
    }
    assert_eq!(scene.plane(Orientation::Sagittal).slab(), (11, 11));
    assert!(!scene.plane(Orientation::Sagittal).is_visible());
    scene.apply_key(&Key::Character("z".into()));
    assert_eq!(scene.plane(Orientation::Axial).slab(), (5, 5));

    let change = apply_slider(&mut scene.actors, 0, 4).unwrap();
    assert_eq!(change.name, "cochlea.vtk");
    assert_eq!(scene.actors[0].opacity(), 0.4);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_inputs_fail_before_composing() {
    let dir = scratch_dir("missing");
    assert!(matches!(
        io::load_volume(dir.join("absent.nrrd")),
        Err(Error::Read { .. })
    ));
    assert!(matches!(
        io::load_mesh_folder(dir.join("absent")),
        Err(Error::Read { .. })
    ));
    fs::remove_dir_all(&dir).unwrap();
}
