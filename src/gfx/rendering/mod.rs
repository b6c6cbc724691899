// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Handles the device, window surfaces, render pipelines, and frame rendering.

pub mod gpu_context;
pub mod pipeline_manager;
pub mod render_engine;
pub mod render_pass_ext;
pub mod vertex;
pub mod window_surface;

// Re-export main types
pub use gpu_context::GpuContext;
pub use pipeline_manager::{PipelineConfig, PipelineManager, PipelineStats};
pub use render_engine::RenderEngine;
pub use window_surface::WindowSurface;
