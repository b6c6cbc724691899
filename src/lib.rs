// src/lib.rs
//! ucho
//!
//! A viewer for inner-ear scans: an NRRD volume cut by three orthogonal slice
//! planes, drawn together with translucent VTK surface meshes, plus a panel of
//! per-surface opacity sliders. Built on wgpu, winit and Dear ImGui.

pub mod app;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gfx;
pub mod io;
pub mod scene;
pub mod ui;
pub mod volume;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ViewerApp;
pub use config::ViewerConfig;
pub use error::{Error, Result};
pub use scene::ViewerScene;
