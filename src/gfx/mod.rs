//! # Graphics Module
//!
//! Everything between the scene and the GPU.
//!
//! - **Camera System** ([`camera`]) - Orbit camera framed on the scene, mouse controls
//! - **Rendering Pipeline** ([`rendering`]) - Device, window surfaces, pipelines and frame drawing
//! - **Resource Management** ([`resources`]) - Uniforms, textures, and per-surface / per-slice buffers
//!
//! Surfaces are lit by a headlight and blended with their opacity; slice planes
//! are textured quads carrying window/levelled voxel values.

pub mod camera;
pub mod rendering;
pub mod resources;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::{GpuContext, RenderEngine, WindowSurface};
