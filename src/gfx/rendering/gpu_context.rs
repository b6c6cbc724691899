//! Device and queue shared by every window
//!
//! The adapter is chosen against the first window's surface; later windows
//! create their own surfaces from the same instance.

use std::sync::Arc;

use winit::window::Window;

use crate::error::{Error, Result};

use super::window_surface::WindowSurface;

pub struct GpuContext {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    /// Creates the device for `window` and returns it with the window's
    /// configured surface.
    pub async fn new(window: Arc<Window>) -> Result<(Self, WindowSurface)> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| Error::Gpu(format!("failed to create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| Error::Gpu(format!("failed to request adapter: {e}")))?;

        let info = adapter.get_info();
        log::info!("Using {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| Error::Gpu(format!("failed to request a device: {e}")))?;

        let context = Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
        };
        let target = WindowSurface::new(&context, window, surface)?;
        Ok((context, target))
    }

    /// Creates and configures a surface for another window on this device.
    pub fn create_window_surface(&self, window: Arc<Window>) -> Result<WindowSurface> {
        let surface = self
            .instance
            .create_surface(window.clone())
            .map_err(|e| Error::Gpu(format!("failed to create surface: {e}")))?;
        WindowSurface::new(self, window, surface)
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    /// Largest 2-D texture the device accepts, in texels per side
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}
