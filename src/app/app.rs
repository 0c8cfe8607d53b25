use std::sync::Arc;
use std::time::Instant;

use egui_wgpu::ScreenDescriptor;
use egui_winit::State;
use log::{info, warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, NamedKey};
use winit::window::Window;

use crate::asset::{AssetLoadResult, AssetManager, AssetPayload};
use crate::error::ViewerError;
use crate::model::ModelTransform;
use crate::renderer::camera::{
    CameraState, IdleResetConfig, IdleResetController, Interaction, OrbitController, OrbitOptions,
};
use crate::renderer::{FrameInputs, Renderer};
use crate::settings::Settings;
use crate::ui::{CameraView, Ui, UiActions};

/// Pixel deltas from trackpads are much finer than wheel lines.
const PIXEL_SCROLL_SCALE: f32 = 0.05;

pub struct EventResponse {
    pub repaint: bool,
    pub exit: bool,
}

pub struct App {
    pub window: Arc<Window>,
    runtime: Handle,
    renderer: Renderer,
    egui_state: State,
    egui_wants_pointer: bool,
    ui: Ui,
    settings: Settings,
    /// Mounted once the viewport has a non-zero height.
    orbit: Option<OrbitController>,
    idle_reset: IdleResetController,
    assets: AssetManager,
    asset_sender: UnboundedSender<AssetLoadResult>,
    asset_receiver: UnboundedReceiver<AssetLoadResult>,
    model_transform: ModelTransform,
    last_frame: Instant,
}

impl App {
    pub async fn new(
        window: Arc<Window>,
        runtime: Handle,
        settings: Settings,
    ) -> Result<Self, ViewerError> {
        let renderer = Renderer::new(window.clone(), &settings.lighting, &settings.post).await?;

        let egui_state = State::new(
            renderer.egui_context(),
            egui::viewport::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        let idle_reset = IdleResetController::new(
            IdleResetConfig::from(&settings.camera),
            runtime.clone(),
        );

        info!("Loading assets from '{}'", settings.scene.asset_root);
        let mut assets = AssetManager::new(&settings.scene);
        let (asset_sender, asset_receiver) = mpsc::unbounded_channel();
        assets.start_all(&runtime, &asset_sender);

        let mut app = Self {
            runtime,
            renderer,
            egui_state,
            egui_wants_pointer: false,
            ui: Ui::new(),
            orbit: None,
            idle_reset,
            assets,
            asset_sender,
            asset_receiver,
            model_transform: ModelTransform::from(&settings.scene),
            last_frame: Instant::now(),
            settings,
            window,
        };
        app.mount_orbit(app.window.inner_size().height);
        Ok(app)
    }

    /// Creates the orbit control on the first non-empty viewport, afterwards
    /// only tracks the viewport height.
    fn mount_orbit(&mut self, height: u32) {
        if height == 0 {
            return;
        }
        if let Some(orbit) = self.orbit.as_mut() {
            orbit.set_viewport_height(height as f32);
            return;
        }
        self.orbit = Some(OrbitController::new(
            self.default_camera(),
            OrbitOptions::from(&self.settings.camera),
            height as f32,
        ));
    }

    fn default_camera(&self) -> CameraState {
        let camera = &self.settings.camera;
        CameraState::looking_at(camera.position, camera.target, camera.fov_degrees)
    }

    /// Reconfigures the surface at the current window size.
    pub fn reconfigure(&mut self) {
        self.renderer.resize(self.window.inner_size());
    }

    pub fn handle_event(&mut self, event: &WindowEvent) -> EventResponse {
        let egui_response = self.egui_state.on_window_event(&self.window, event);
        let ignored = EventResponse {
            repaint: egui_response.repaint,
            exit: false,
        };

        match event {
            WindowEvent::CloseRequested => {
                return EventResponse {
                    repaint: false,
                    exit: true,
                };
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if egui_response.consumed || event.state != ElementState::Pressed {
                    return ignored;
                }
                match &event.logical_key {
                    Key::Named(NamedKey::Escape) => {
                        return EventResponse {
                            repaint: false,
                            exit: true,
                        };
                    }
                    Key::Named(NamedKey::F1) => {
                        self.settings.display.show_panel = !self.settings.display.show_panel;
                        self.settings.display.save();
                    }
                    _ => {}
                }
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(*size);
                self.mount_orbit(size.height);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                // Releases always reach the orbit so a drag ending over the panel still ends.
                if pressed && self.egui_wants_pointer {
                    return ignored;
                }
                if let Some(orbit) = self.orbit.as_mut() {
                    match orbit.on_mouse_button(*button, pressed) {
                        Some(Interaction::Start) => self.idle_reset.on_interaction_start(orbit),
                        Some(Interaction::End) => self.idle_reset.on_interaction_end(),
                        None => {}
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(orbit) = self.orbit.as_mut() {
                    if self.egui_wants_pointer && !orbit.is_dragging() {
                        return ignored;
                    }
                    orbit.on_mouse_move((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if self.egui_wants_pointer {
                    return ignored;
                }
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * PIXEL_SCROLL_SCALE,
                };
                if let Some(orbit) = self.orbit.as_mut() {
                    if orbit.on_wheel(amount) {
                        self.idle_reset.on_interaction_start(orbit);
                        self.idle_reset.on_interaction_end();
                    }
                }
            }
            _ => {}
        }

        EventResponse {
            repaint: false,
            exit: false,
        }
    }

    fn drain_assets(&mut self) {
        while let Ok(result) = self.asset_receiver.try_recv() {
            if let AssetLoadResult::Error { slot, error } = &result {
                warn!("Failed to load {slot}: {error}");
            }
            let Some((slot, payload)) = self.assets.apply(result) else {
                continue;
            };
            info!("Loaded {slot}: {}", payload.detail());
            match payload {
                AssetPayload::Mesh(model) => self.renderer.upload_model(&model),
                AssetPayload::Texture(texture) => {
                    self.renderer.set_material_texture(slot, &texture)
                }
                AssetPayload::Environment(image) => self.renderer.set_environment(&image),
            }
        }
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.drain_assets();

        // The reset steers the orbit target before the orbit integrates damping.
        self.idle_reset.on_frame_tick(self.orbit.as_mut());
        if let Some(orbit) = self.orbit.as_mut() {
            orbit.update();
        }

        if self.settings.display.spin_model {
            self.model_transform
                .advance_spin(dt, self.settings.display.spin_speed);
        }

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let egui_ctx = self.renderer.egui_context();
        let camera_view = CameraView {
            phase: self.idle_reset.phase(),
            polar: self.orbit.as_ref().map(|orbit| orbit.state().polar),
            limits_open: self
                .orbit
                .as_ref()
                .is_none_or(|orbit| orbit.limits().is_unrestricted()),
        };

        let mut actions = UiActions::default();
        let full_output = egui_ctx.run(raw_input, |ctx| {
            actions = self
                .ui
                .show(ctx, &camera_view, &mut self.settings, &self.assets);
        });
        self.egui_wants_pointer = egui_ctx.wants_pointer_input() || egui_ctx.is_pointer_over_area();

        if actions.reset_view {
            if let Some(orbit) = self.orbit.as_mut() {
                self.idle_reset.on_interaction_start(orbit);
                orbit.reset();
            }
        }
        if actions.retry_failed {
            let restarted = self
                .assets
                .retry_failed(&self.runtime, &self.asset_sender);
            info!("Retrying {restarted} failed asset(s)");
        }

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);
        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        let size = self.window.inner_size();
        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let fallback;
        let camera = match self.orbit.as_ref() {
            Some(orbit) => orbit.state(),
            None => {
                fallback = self.default_camera();
                &fallback
            }
        };

        let inputs = FrameInputs {
            camera,
            camera_settings: &self.settings.camera,
            model_transform: &self.model_transform,
            display: &self.settings.display,
            lighting: &self.settings.lighting,
            post: &self.settings.post,
        };
        self.renderer.render(
            &inputs,
            paint_jobs,
            full_output.textures_delta,
            screen_descriptor,
        )
    }
}
