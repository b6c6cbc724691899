use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalPosition, LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    error::{Error, Result},
    gfx::rendering::{GpuContext, RenderEngine, WindowSurface},
    scene::ViewerScene,
    ui::{PanelWindow, PANEL_TITLE},
};

pub const SCENE_TITLE: &str = "ucho";

/// Panel geometry in logical pixels
const PANEL_SIZE: (f64, f64) = (400.0, 600.0);
const PANEL_POSITION: (f64, f64) = (100.0, 100.0);

/// Runs the scene window and the opacity panel on one event loop until both
/// are closed.
pub struct ViewerApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

/// The scene window with the renderer drawing into it
struct SceneWindow {
    target: WindowSurface,
    engine: RenderEngine,
}

struct AppState {
    scene: ViewerScene,
    scene_size: PhysicalSize<u32>,
    gpu: Option<GpuContext>,
    scene_window: Option<SceneWindow>,
    panel: Option<PanelWindow>,
    started: bool,
    error: Option<Error>,
}

impl ViewerApp {
    pub fn new(scene: ViewerScene, width: u32, height: u32) -> Result<Self> {
        let event_loop = EventLoop::new()
            .map_err(|e| Error::Window(format!("failed to create event loop: {e}")))?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                scene,
                scene_size: PhysicalSize::new(width, height),
                gpu: None,
                scene_window: None,
                panel: None,
                started: false,
                error: None,
            },
        })
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) -> Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .ok_or_else(|| Error::Window("event loop already consumed".into()))?;
        event_loop.set_control_flow(ControlFlow::Wait);

        event_loop
            .run_app(&mut self.app_state)
            .map_err(|e| Error::Window(format!("event loop failed: {e}")))?;

        match self.app_state.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let scene_window = create_window(
            event_loop,
            WindowAttributes::default()
                .with_title(SCENE_TITLE)
                .with_inner_size(self.scene_size),
        )?;
        let (gpu, target) = pollster::block_on(GpuContext::new(scene_window))?;

        let (width, height) = target.size();
        let engine = RenderEngine::new(
            gpu.device.clone(),
            gpu.queue.clone(),
            target.format(),
            width,
            height,
        )?;
        self.scene.init_gpu_resources(
            &gpu.device,
            engine.material_layouts(),
            gpu.max_texture_dimension(),
        );
        self.scene.frame_camera(width, height);

        let panel_window = create_window(
            event_loop,
            WindowAttributes::default()
                .with_title(PANEL_TITLE)
                .with_inner_size(LogicalSize::new(PANEL_SIZE.0, PANEL_SIZE.1))
                .with_position(LogicalPosition::new(PANEL_POSITION.0, PANEL_POSITION.1)),
        )?;
        let panel_target = gpu.create_window_surface(panel_window)?;
        let panel = PanelWindow::new(&gpu, panel_target);

        target.request_redraw();
        panel.request_redraw();

        self.scene_window = Some(SceneWindow { target, engine });
        self.panel = Some(panel);
        self.gpu = Some(gpu);
        log::info!("Viewer ready with {} surfaces", self.scene.actors.len());
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        log::error!("{error}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn close_if_done(&self, event_loop: &ActiveEventLoop) {
        if self.scene_window.is_none() && self.panel.is_none() {
            event_loop.exit();
        }
    }

    fn scene_window_event(&mut self, event_loop: &ActiveEventLoop, event: WindowEvent) {
        let Some(scene_window) = self.scene_window.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                self.scene_window = None;
                self.close_if_done(event_loop);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if scene_window.target.resize(width, height) {
                    scene_window.engine.resize(width, height);
                    let camera = &mut self.scene.camera_manager.camera;
                    camera.resize_projection(width, height);
                    camera.update_view_proj();
                    scene_window.target.request_redraw();
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if self.scene.apply_key(&logical_key) {
                    scene_window.target.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = scene_window
                    .engine
                    .render_frame(&mut scene_window.target, &mut self.scene)
                {
                    self.fail(event_loop, e);
                }
            }
            other => {
                if self.scene.camera_manager.process_event(&other) {
                    scene_window.target.request_redraw();
                }
            }
        }
    }

    fn panel_window_event(&mut self, event_loop: &ActiveEventLoop, event: WindowEvent) {
        let (Some(panel), Some(gpu)) = (self.panel.as_mut(), self.gpu.as_ref()) else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                self.panel = None;
                self.close_if_done(event_loop);
            }
            WindowEvent::RedrawRequested => match panel.render(gpu, &mut self.scene) {
                Ok(changes) => {
                    if !changes.is_empty() {
                        if let Some(scene_window) = &self.scene_window {
                            scene_window.target.request_redraw();
                        }
                    }
                }
                Err(e) => self.fail(event_loop, e),
            },
            other => {
                if panel.handle_event(&other) {
                    panel.request_redraw();
                }
            }
        }
    }
}

fn create_window(
    event_loop: &ActiveEventLoop,
    attributes: WindowAttributes,
) -> Result<Arc<Window>> {
    event_loop
        .create_window(attributes)
        .map(Arc::new)
        .map_err(|e| Error::Window(format!("failed to create window: {e}")))
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let is_scene = self
            .scene_window
            .as_ref()
            .is_some_and(|w| w.target.window.id() == window_id);
        let is_panel = self.panel.as_ref().is_some_and(|p| p.id() == window_id);

        if is_scene {
            self.scene_window_event(event_loop, event);
        } else if is_panel {
            self.panel_window_event(event_loop, event);
        }
    }
}
