//! # User Interface Module
//!
//! A Dear ImGui opacity panel living in its own top-level window, next to the
//! scene window.
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu
//! - [`opacity_panel`] - One label and one 1..=10 slider per surface
//! - [`PanelWindow`] - The window, surface and UI manager the panel is drawn with
//!
//! Both windows run on the same event loop and edit the same
//! [`ViewerScene`](crate::scene::ViewerScene).

pub mod manager;
pub mod opacity_panel;
pub mod panel_window;

// Re-export main types
pub use manager::UiManager;
pub use opacity_panel::{apply_slider, opacity_panel, OpacityChange, PANEL_TITLE};
pub use panel_window::PanelWindow;
