// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures, buffers, and bind groups for rendering.

pub mod global_bindings;
pub mod material;
pub mod slice_buffers;
pub mod surface_buffers;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO};
pub use material::{MaterialLayouts, MaterialUniform};
pub use slice_buffers::SliceBuffers;
pub use surface_buffers::SurfaceBuffers;
pub use texture_resource::{DepthTexture, TextureResource};
