use crate::asset::AssetManager;
use crate::renderer::camera::ResetPhase;
use crate::settings::Settings;

/// Camera facts shown in the overlay.
pub struct CameraView {
    pub phase: ResetPhase,
    /// `None` until the orbit control is mounted.
    pub polar: Option<f32>,
    /// Whether the orbit limits are fully open.
    pub limits_open: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UiActions {
    pub reset_view: bool,
    pub retry_failed: bool,
}

fn phase_label(phase: ResetPhase) -> (&'static str, egui::Color32) {
    match phase {
        ResetPhase::Free => ("Free", egui::Color32::GREEN),
        ResetPhase::IdlePending => ("Idle, reset pending", egui::Color32::YELLOW),
        ResetPhase::Resetting => ("Resetting", egui::Color32::LIGHT_BLUE),
    }
}

#[derive(Default)]
pub struct Ui;

impl Ui {
    pub fn new() -> Self {
        Self
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        camera: &CameraView,
        settings: &mut Settings,
        assets: &AssetManager,
    ) -> UiActions {
        let mut actions = UiActions::default();
        if !settings.display.show_panel {
            return actions;
        }

        let mut open = true;
        egui::Window::new("Viewer")
            .default_width(320.0)
            .resizable(true)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.heading("Camera");
                let (label, color) = phase_label(camera.phase);
                ui.horizontal(|ui| {
                    ui.label("Reset:");
                    ui.colored_label(color, label);
                });
                match camera.polar {
                    Some(polar) => ui.label(format!("Polar: {:.1}°", polar.to_degrees())),
                    None => ui.label("Polar: -"),
                };
                ui.label(if camera.limits_open {
                    "Limits: open"
                } else {
                    "Limits: pinned"
                });
                if ui.button("Reset view").clicked() {
                    actions.reset_view = true;
                }

                ui.separator();
                ui.heading("Assets");
                ui.horizontal(|ui| {
                    ui.colored_label(
                        egui::Color32::GREEN,
                        format!("Loaded: {}", assets.loaded_count()),
                    );
                    ui.separator();
                    ui.colored_label(
                        egui::Color32::YELLOW,
                        format!("Loading: {}", assets.loading_count()),
                    );
                    ui.separator();
                    ui.colored_label(
                        egui::Color32::RED,
                        format!("Errors: {}", assets.error_count()),
                    );
                });
                for asset in &assets.assets {
                    ui.horizontal(|ui| {
                        let radius = 5.0;
                        let (rect, _response) = ui.allocate_exact_size(
                            egui::vec2(radius * 2.0, radius * 2.0),
                            egui::Sense::hover(),
                        );
                        ui.painter()
                            .circle_filled(rect.center(), radius, asset.status_color());
                        ui.label(asset.slot.label());
                        ui.label(asset.status_text()).on_hover_text(asset.reference.as_str());
                    });
                }
                if assets.error_count() > 0 && ui.button("Retry failed").clicked() {
                    actions.retry_failed = true;
                }

                ui.separator();
                ui.heading("Display");
                let mut display_changed = false;
                display_changed |= ui
                    .checkbox(&mut settings.display.show_grid, "Show grid")
                    .changed();
                display_changed |= ui
                    .checkbox(&mut settings.display.show_ground, "Show ground")
                    .changed();
                display_changed |= ui
                    .checkbox(&mut settings.display.spin_model, "Spin model")
                    .changed();
                display_changed |= ui
                    .add(
                        egui::Slider::new(&mut settings.display.spin_speed, 0.0..=3.0)
                            .text("Spin speed")
                            .suffix(" rad/s"),
                    )
                    .changed();
                if display_changed {
                    settings.display.save();
                }

                ui.separator();
                ui.heading("Lighting");
                let mut lighting_changed = false;
                lighting_changed |= ui
                    .add(
                        egui::Slider::new(&mut settings.lighting.exposure, 0.0..=3.0)
                            .text("Exposure"),
                    )
                    .changed();
                lighting_changed |= ui
                    .add(
                        egui::Slider::new(&mut settings.lighting.environment_intensity, 0.0..=3.0)
                            .text("Environment"),
                    )
                    .changed();
                lighting_changed |= ui
                    .add(
                        egui::Slider::new(&mut settings.lighting.ambient_intensity, 0.0..=3.0)
                            .text("Ambient"),
                    )
                    .changed();
                if lighting_changed {
                    settings.lighting.save();
                }

                ui.separator();
                ui.heading("Post");
                let mut post_changed = false;
                post_changed |= ui
                    .add(
                        egui::Slider::new(&mut settings.post.brightness, -1.0..=1.0)
                            .text("Brightness"),
                    )
                    .changed();
                post_changed |= ui
                    .add(
                        egui::Slider::new(&mut settings.post.contrast, -1.0..=0.99)
                            .text("Contrast"),
                    )
                    .changed();
                if post_changed {
                    settings.post.save();
                }
            });

        if !open {
            settings.display.show_panel = false;
            settings.display.save();
        }

        actions
    }
}
