use std::f32::consts::TAU;

use nalgebra_glm as glm;

use super::{CameraState, OrbitConstraints, OrbitLimits};
use crate::settings::CameraSettings;

/// Drag lifecycle reported to whoever cares about user activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Start,
    End,
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitOptions {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub enable_zoom: bool,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub enable_pan: bool,
}

impl Default for OrbitOptions {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            enable_zoom: false,
            zoom_speed: 1.0,
            min_distance: 0.05,
            max_distance: 100.0,
            enable_pan: false,
        }
    }
}

impl From<&CameraSettings> for OrbitOptions {
    fn from(settings: &CameraSettings) -> Self {
        Self {
            enable_damping: settings.enable_damping,
            damping_factor: settings.damping_factor,
            rotate_speed: settings.rotate_speed,
            enable_zoom: settings.enable_zoom,
            enable_pan: settings.enable_pan,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    Rotate,
    Pan,
}

/// Damped orbit control around a target.
///
/// Input handlers only accumulate deltas; `update` applies them once per
/// frame, clamps the pose against `limits` and bleeds off the remaining
/// velocity.
pub struct OrbitController {
    state: CameraState,
    limits: OrbitLimits,
    options: OrbitOptions,
    azimuth_delta: f32,
    polar_delta: f32,
    pan_offset: glm::Vec3,
    zoom_scale: f32,
    viewport_height: f32,
    drag: Option<DragMode>,
    last_mouse_pos: Option<(f64, f64)>,
}

impl OrbitController {
    pub fn new(state: CameraState, options: OrbitOptions, viewport_height: f32) -> Self {
        Self {
            state,
            limits: OrbitLimits::UNRESTRICTED,
            options,
            azimuth_delta: 0.0,
            polar_delta: 0.0,
            pan_offset: glm::Vec3::zeros(),
            zoom_scale: 1.0,
            viewport_height: viewport_height.max(1.0),
            drag: None,
            last_mouse_pos: None,
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn limits(&self) -> &OrbitLimits {
        &self.limits
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        if height > 0.0 {
            self.viewport_height = height;
        }
    }

    /// Left button orbits, right button pans when panning is enabled.
    pub fn on_mouse_button(
        &mut self,
        button: winit::event::MouseButton,
        pressed: bool,
    ) -> Option<Interaction> {
        let mode = match button {
            winit::event::MouseButton::Left => DragMode::Rotate,
            winit::event::MouseButton::Right if self.options.enable_pan => DragMode::Pan,
            _ => return None,
        };

        match (pressed, self.drag) {
            (true, None) => {
                self.drag = Some(mode);
                self.last_mouse_pos = None;
                Some(Interaction::Start)
            }
            (false, Some(active)) if active == mode => {
                self.drag = None;
                self.last_mouse_pos = None;
                Some(Interaction::End)
            }
            _ => None,
        }
    }

    pub fn on_mouse_move(&mut self, position: (f64, f64)) {
        let Some(mode) = self.drag else {
            self.last_mouse_pos = None;
            return;
        };

        if let Some(last_pos) = self.last_mouse_pos {
            let delta_x = (position.0 - last_pos.0) as f32;
            let delta_y = (position.1 - last_pos.1) as f32;
            match mode {
                DragMode::Rotate => self.rotate(delta_x, delta_y),
                DragMode::Pan => self.pan(delta_x, delta_y),
            }
        }
        self.last_mouse_pos = Some(position);
    }

    /// Returns whether the wheel did anything. A handled wheel step counts
    /// as a complete interaction, so it is ignored while a drag is active.
    pub fn on_wheel(&mut self, delta: f32) -> bool {
        if !self.options.enable_zoom || delta == 0.0 || self.drag.is_some() {
            return false;
        }
        let step = 0.95_f32.powf(self.options.zoom_speed);
        if delta > 0.0 {
            self.zoom_scale *= step;
        } else {
            self.zoom_scale /= step;
        }
        true
    }

    fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        let per_pixel = TAU / self.viewport_height * self.options.rotate_speed;
        self.azimuth_delta -= delta_x * per_pixel;
        self.polar_delta -= delta_y * per_pixel;
    }

    /// Moves the target in the view plane, scaled so the point under the
    /// cursor follows it at the target's depth.
    fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let eye = self.state.eye();
        let target = glm::vec3(
            self.state.target[0],
            self.state.target[1],
            self.state.target[2],
        );
        let forward = glm::normalize(&(target - glm::vec3(eye[0], eye[1], eye[2])));
        let right = glm::normalize(&glm::cross(&forward, &glm::vec3(0.0, 1.0, 0.0)));
        let up = glm::cross(&right, &forward);

        let world_per_pixel =
            2.0 * self.state.distance * (self.state.fov_y / 2.0).tan() / self.viewport_height;
        self.pan_offset += right * (-delta_x * world_per_pixel) + up * (delta_y * world_per_pixel);
    }

    /// Applies one frame of accumulated input. Returns whether the pose moved.
    pub fn update(&mut self) -> bool {
        let before = (
            self.state.azimuth,
            self.state.polar,
            self.state.distance,
            self.state.target,
        );

        let blend = if self.options.enable_damping {
            self.options.damping_factor
        } else {
            1.0
        };

        self.state.azimuth = self
            .limits
            .clamp_azimuth(self.state.azimuth + self.azimuth_delta * blend);
        self.state.polar = self
            .limits
            .clamp_polar(self.state.polar + self.polar_delta * blend);

        self.state.distance = (self.state.distance * self.zoom_scale)
            .clamp(self.options.min_distance, self.options.max_distance);

        let pan = self.pan_offset * blend;
        self.state.target[0] += pan.x;
        self.state.target[1] += pan.y;
        self.state.target[2] += pan.z;

        if self.options.enable_damping {
            let keep = 1.0 - self.options.damping_factor;
            self.azimuth_delta *= keep;
            self.polar_delta *= keep;
            self.pan_offset *= keep;
        } else {
            self.azimuth_delta = 0.0;
            self.polar_delta = 0.0;
            self.pan_offset = glm::Vec3::zeros();
        }
        self.zoom_scale = 1.0;

        before
            != (
                self.state.azimuth,
                self.state.polar,
                self.state.distance,
                self.state.target,
            )
    }

    /// Back to the initial pose with no leftover velocity.
    pub fn reset(&mut self) {
        self.state.reset();
        self.azimuth_delta = 0.0;
        self.polar_delta = 0.0;
        self.pan_offset = glm::Vec3::zeros();
        self.zoom_scale = 1.0;
        self.last_mouse_pos = None;
    }
}

impl OrbitConstraints for OrbitController {
    fn polar_angle(&self) -> f32 {
        self.state.polar
    }

    fn limits_mut(&mut self) -> &mut OrbitLimits {
        &mut self.limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;
    use winit::event::MouseButton;

    fn controller(options: OrbitOptions) -> OrbitController {
        OrbitController::new(
            CameraState::new(0.0, FRAC_PI_2, 1.0, [0.0; 3], 50f32.to_radians()),
            options,
            600.0,
        )
    }

    fn drag(ctl: &mut OrbitController, from: (f64, f64), to: (f64, f64)) {
        ctl.on_mouse_move(from);
        ctl.on_mouse_move(to);
    }

    #[test]
    fn left_button_reports_start_and_end() {
        let mut ctl = controller(OrbitOptions::default());
        assert_eq!(
            ctl.on_mouse_button(MouseButton::Left, true),
            Some(Interaction::Start)
        );
        assert!(ctl.is_dragging());
        assert_eq!(
            ctl.on_mouse_button(MouseButton::Left, false),
            Some(Interaction::End)
        );
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut ctl = controller(OrbitOptions::default());
        assert_eq!(ctl.on_mouse_button(MouseButton::Left, false), None);
    }

    #[test]
    fn right_button_is_inert_while_pan_disabled() {
        let mut ctl = controller(OrbitOptions::default());
        assert_eq!(ctl.on_mouse_button(MouseButton::Right, true), None);
    }

    #[test]
    fn undamped_drag_applies_in_one_update() {
        let mut ctl = controller(OrbitOptions {
            enable_damping: false,
            ..OrbitOptions::default()
        });
        ctl.on_mouse_button(MouseButton::Left, true);
        drag(&mut ctl, (100.0, 100.0), (130.0, 100.0));
        assert!(ctl.update());

        // 30 px of a 600 px viewport is a twentieth of a full turn.
        assert_relative_eq!(ctl.state().azimuth, -TAU / 20.0, epsilon = 1e-5);
        assert!(!ctl.update());
    }

    #[test]
    fn damping_spreads_motion_over_frames() {
        let mut ctl = controller(OrbitOptions::default());
        ctl.on_mouse_button(MouseButton::Left, true);
        drag(&mut ctl, (0.0, 0.0), (60.0, 0.0));
        ctl.on_mouse_button(MouseButton::Left, false);

        let full_turn = -TAU / 10.0;
        ctl.update();
        let first = ctl.state().azimuth;
        assert_relative_eq!(first, full_turn * 0.05, epsilon = 1e-5);

        // Keeps coasting after release.
        ctl.update();
        assert!(ctl.state().azimuth < first);

        for _ in 0..2000 {
            ctl.update();
        }
        assert_relative_eq!(ctl.state().azimuth, full_turn, epsilon = 1e-3);
    }

    #[test]
    fn pinned_polar_limits_override_drag() {
        let mut ctl = controller(OrbitOptions {
            enable_damping: false,
            ..OrbitOptions::default()
        });
        ctl.limits_mut().pin_polar(1.0);
        ctl.on_mouse_button(MouseButton::Left, true);
        drag(&mut ctl, (0.0, 0.0), (0.0, 200.0));
        ctl.update();
        assert_eq!(ctl.polar_angle(), 1.0);
    }

    #[test]
    fn wheel_needs_zoom_enabled() {
        let mut ctl = controller(OrbitOptions::default());
        assert!(!ctl.on_wheel(1.0));
        ctl.update();
        assert_relative_eq!(ctl.state().distance, 1.0);

        let mut ctl = controller(OrbitOptions {
            enable_zoom: true,
            ..OrbitOptions::default()
        });
        assert!(ctl.on_wheel(1.0));
        ctl.update();
        assert!(ctl.state().distance < 1.0);
    }

    #[test]
    fn wheel_is_ignored_while_dragging() {
        let mut ctl = controller(OrbitOptions {
            enable_zoom: true,
            ..OrbitOptions::default()
        });
        ctl.on_mouse_button(MouseButton::Left, true);
        assert!(!ctl.on_wheel(1.0));
        ctl.update();
        assert_relative_eq!(ctl.state().distance, 1.0);

        ctl.on_mouse_button(MouseButton::Left, false);
        assert!(ctl.on_wheel(1.0));
    }

    #[test]
    fn pan_moves_target_when_enabled() {
        let mut ctl = controller(OrbitOptions {
            enable_pan: true,
            enable_damping: false,
            ..OrbitOptions::default()
        });
        assert_eq!(
            ctl.on_mouse_button(MouseButton::Right, true),
            Some(Interaction::Start)
        );
        drag(&mut ctl, (0.0, 0.0), (50.0, 0.0));
        ctl.update();
        let target = ctl.state().target;
        assert!(target.iter().any(|c| c.abs() > 1e-4));
        assert_relative_eq!(target[1], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn reset_discards_coasting_velocity() {
        let mut ctl = controller(OrbitOptions::default());
        ctl.on_mouse_button(MouseButton::Left, true);
        drag(&mut ctl, (0.0, 0.0), (80.0, 40.0));
        ctl.on_mouse_button(MouseButton::Left, false);
        ctl.update();
        ctl.reset();
        assert!(!ctl.update());
        assert_eq!(ctl.state().azimuth, 0.0);
    }
}
