//! The opacity panel's own top-level window

use winit::event::WindowEvent;

use crate::{
    error::Result,
    gfx::rendering::{GpuContext, WindowSurface},
    scene::ViewerScene,
};

use super::{
    manager::UiManager,
    opacity_panel::{opacity_panel, OpacityChange},
};

const PANEL_BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.94,
    g: 0.94,
    b: 0.94,
    a: 1.0,
};

pub struct PanelWindow {
    target: WindowSurface,
    ui: UiManager,
}

impl PanelWindow {
    pub fn new(context: &GpuContext, target: WindowSurface) -> Self {
        let ui = UiManager::new(&context.device, &context.queue, target.format(), &target.window);
        Self { target, ui }
    }

    pub fn id(&self) -> winit::window::WindowId {
        self.target.window.id()
    }

    /// Returns true when the panel should be redrawn.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        if let WindowEvent::Resized(size) = event {
            self.target.resize(size.width, size.height);
        }
        self.ui.handle_input(&self.target.window, event)
    }

    pub fn request_redraw(&self) {
        self.target.request_redraw();
    }

    /// Draws the sliders and applies whatever the user changed.
    pub fn render(
        &mut self,
        context: &GpuContext,
        scene: &mut ViewerScene,
    ) -> Result<Vec<OpacityChange>> {
        let Some(frame) = self.target.acquire()? else {
            return Ok(Vec::new());
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut changes = Vec::new();
        self.ui.update_logic(&self.target.window, |ui| {
            changes = opacity_panel(ui, &mut scene.actors);
        })?;

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Panel Encoder"),
            });
        self.ui.render(
            &context.device,
            &context.queue,
            &mut encoder,
            &view,
            Some(PANEL_BACKGROUND),
        )?;
        context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(changes)
    }
}
