use std::sync::Arc;

use log::error;
use tokio::runtime::Runtime;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use crate::app::app::App;
use crate::settings::Settings;

pub struct AppHandler {
    pub app: Option<App>,
    pub mesh_override: Option<String>,
    pub runtime: Runtime,
}

impl AppHandler {
    pub fn new(mesh_override: Option<String>, runtime: Runtime) -> Self {
        Self {
            app: None,
            mesh_override,
            runtime,
        }
    }
}

impl ApplicationHandler for AppHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("glbvis-rs")
            .with_inner_size(winit::dpi::LogicalSize::new(1200.0, 800.0));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut settings = Settings::load();
        if let Some(mesh) = &self.mesh_override {
            settings.scene.override_mesh(mesh);
        }

        let runtime_handle = self.runtime.handle().clone();
        match self
            .runtime
            .block_on(App::new(window, runtime_handle, settings))
        {
            Ok(app) => self.app = Some(app),
            Err(e) => {
                error!("Failed to start viewer: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(app) = &mut self.app {
            let response = app.handle_event(&event);
            if response.repaint {
                app.window.request_redraw();
            }
            if response.exit {
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = &mut self.app {
            match app.render() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => app.reconfigure(),
                Err(e) => error!("Render error: {e:?}"),
            }
            app.window.request_redraw();
        }
    }
}
