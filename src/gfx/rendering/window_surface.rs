use std::sync::Arc;

use winit::window::Window;

use crate::error::{Error, Result};

use super::gpu_context::GpuContext;

/// A window together with the swapchain surface it presents to
pub struct WindowSurface {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    device: Arc<wgpu::Device>,
}

impl WindowSurface {
    pub fn new(
        context: &GpuContext,
        window: Arc<Window>,
        surface: wgpu::Surface<'static>,
    ) -> Result<Self> {
        let capabilities = surface.get_capabilities(context.adapter());
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| Error::Gpu("surface is not supported by the adapter".into()))?;
        let alpha_mode = capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&context.device, &config);

        Ok(Self {
            window,
            surface,
            config,
            device: context.device.clone(),
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigures for a new size. Returns false for a minimized window.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        true
    }

    /// Next swapchain texture, or `None` when this frame should be skipped.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped; only
    /// running out of memory is an error.
    pub fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("timed out acquiring a frame, skipping it");
                Ok(None)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                Err(Error::Gpu("out of memory acquiring a frame".into()))
            }
            Err(e) => {
                log::warn!("failed to acquire a frame: {e}");
                Ok(None)
            }
        }
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}
