use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use log::{info, warn};
use tokio::runtime::Handle;

use super::idle_timer::IdleTimer;
use super::{OrbitConstraints, OrbitLimits};
use crate::settings::CameraSettings;

/// Quiet time after a drag before the camera starts leveling itself.
pub const IDLE_RESET_DELAY: Duration = Duration::from_millis(2500);
/// Fraction of the remaining polar error removed per frame.
pub const RESET_BLEND: f32 = 0.03;
/// Polar error, in radians, at which the reset counts as finished.
pub const RESET_EPSILON: f32 = 0.001;
/// Eye level.
pub const RESET_TARGET_POLAR: f32 = FRAC_PI_2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdleResetConfig {
    pub delay: Duration,
    pub blend: f32,
    pub epsilon: f32,
    pub target_polar: f32,
}

impl Default for IdleResetConfig {
    fn default() -> Self {
        Self {
            delay: IDLE_RESET_DELAY,
            blend: RESET_BLEND,
            epsilon: RESET_EPSILON,
            target_polar: RESET_TARGET_POLAR,
        }
    }
}

/// The reset only converges for a blend in (0, 1] and a positive epsilon.
impl From<&CameraSettings> for IdleResetConfig {
    fn from(settings: &CameraSettings) -> Self {
        let blend = if settings.reset_blend > 0.0 && settings.reset_blend <= 1.0 {
            settings.reset_blend
        } else {
            warn!(
                "Camera reset_blend {} is outside (0, 1], using {RESET_BLEND}",
                settings.reset_blend
            );
            RESET_BLEND
        };
        let epsilon = if settings.reset_epsilon > 0.0 {
            settings.reset_epsilon
        } else {
            warn!(
                "Camera reset_epsilon {} is not positive, using {RESET_EPSILON}",
                settings.reset_epsilon
            );
            RESET_EPSILON
        };
        Self {
            delay: Duration::from_millis(settings.idle_reset_ms),
            blend,
            epsilon,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPhase {
    /// Limits open, nothing scheduled.
    Free,
    /// Limits open, idle timer armed.
    IdlePending,
    /// Polar range collapsing toward eye level.
    Resetting,
}

/// Keeps the orbit free while the user drags and, after a quiet period,
/// eases the polar angle back to eye level by pinning the polar limits to
/// a value that moves a fixed fraction closer every frame.
///
/// The blend is per frame rather than per second, so the approach speed
/// follows the frame rate.
pub struct IdleResetController {
    config: IdleResetConfig,
    runtime: Handle,
    pending_reset: bool,
    idle_timer: Option<IdleTimer>,
}

impl IdleResetController {
    pub fn new(config: IdleResetConfig, runtime: Handle) -> Self {
        Self {
            config,
            runtime,
            pending_reset: false,
            idle_timer: None,
        }
    }

    pub fn phase(&self) -> ResetPhase {
        if self.pending_reset {
            ResetPhase::Resetting
        } else if self.idle_timer.is_some() {
            ResetPhase::IdlePending
        } else {
            ResetPhase::Free
        }
    }

    pub fn on_interaction_start<C: OrbitConstraints + ?Sized>(&mut self, controls: &mut C) {
        *controls.limits_mut() = OrbitLimits::UNRESTRICTED;
        self.pending_reset = false;
        self.cancel_idle_timer();
    }

    /// Arms the idle timer, replacing any timer already running.
    pub fn on_interaction_end(&mut self) {
        self.cancel_idle_timer();
        self.idle_timer = Some(IdleTimer::start(&self.runtime, self.config.delay));
    }

    /// Runs once per rendered frame. `controls` is `None` until the orbit
    /// control exists; the step is skipped for that frame.
    pub fn on_frame_tick<C: OrbitConstraints + ?Sized>(&mut self, controls: Option<&mut C>) {
        self.poll_idle_timer();

        if !self.pending_reset {
            return;
        }
        let Some(controls) = controls else {
            return;
        };
        self.step(controls);
    }

    fn poll_idle_timer(&mut self) {
        let expired = self
            .idle_timer
            .as_mut()
            .is_some_and(|timer| timer.has_expired());
        if expired {
            self.idle_timer = None;
            self.on_idle_timeout();
        }
    }

    fn on_idle_timeout(&mut self) {
        self.pending_reset = true;
        info!("[3D] Resetting camera position...");
    }

    fn step<C: OrbitConstraints + ?Sized>(&mut self, controls: &mut C) {
        let beta = controls.polar_angle();
        let target = self.config.target_polar;
        let new_beta = lerp(beta, target, self.config.blend);

        controls.limits_mut().pin_polar(new_beta);

        if (new_beta - target).abs() < self.config.epsilon {
            info!("[3D] Camera position reset.");
            self.on_interaction_start(controls);
        }
    }

    fn cancel_idle_timer(&mut self) {
        // Dropping the handle aborts the timer task.
        self.idle_timer = None;
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::camera::{CameraState, OrbitController, OrbitOptions};
    use approx::assert_relative_eq;

    fn orbit_at(polar: f32) -> OrbitController {
        OrbitController::new(
            CameraState::new(0.0, polar, 1.0, [0.0; 3], 50f32.to_radians()),
            OrbitOptions::default(),
            600.0,
        )
    }

    fn reset_controller() -> IdleResetController {
        IdleResetController::new(IdleResetConfig::default(), Handle::current())
    }

    async fn elapse(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        tokio::task::yield_now().await;
    }

    /// One host frame: reset step first, then the control applies its limits.
    fn frame(reset: &mut IdleResetController, orbit: &mut OrbitController) {
        reset.on_frame_tick(Some(orbit));
        orbit.update();
    }

    #[tokio::test(start_paused = true)]
    async fn starts_free() {
        let reset = reset_controller();
        assert_eq!(reset.phase(), ResetPhase::Free);
        assert_ne!(reset.phase(), ResetPhase::Resetting);
    }

    #[tokio::test(start_paused = true)]
    async fn interaction_start_opens_limits_from_any_phase() {
        let mut orbit = orbit_at(0.3);
        let mut reset = reset_controller();

        orbit.limits_mut().pin_polar(0.7);
        orbit.limits_mut().min_azimuth = -1.0;
        orbit.limits_mut().max_azimuth = 1.0;
        reset.on_interaction_start(&mut orbit);
        assert!(orbit.limits().is_unrestricted());
        assert_eq!(reset.phase(), ResetPhase::Free);

        reset.on_interaction_end();
        reset.on_interaction_start(&mut orbit);
        assert!(orbit.limits().is_unrestricted());
        assert_eq!(reset.phase(), ResetPhase::Free);

        reset.on_interaction_end();
        elapse(2500).await;
        frame(&mut reset, &mut orbit);
        assert_eq!(reset.phase(), ResetPhase::Resetting);
        reset.on_interaction_start(&mut orbit);
        assert!(orbit.limits().is_unrestricted());
        assert_ne!(reset.phase(), ResetPhase::Resetting);
        assert_eq!(reset.phase(), ResetPhase::Free);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_fires_after_exactly_the_idle_delay() {
        let mut orbit = orbit_at(0.3);
        let mut reset = reset_controller();

        reset.on_interaction_end();
        assert_eq!(reset.phase(), ResetPhase::IdlePending);

        elapse(2499).await;
        frame(&mut reset, &mut orbit);
        assert_eq!(reset.phase(), ResetPhase::IdlePending);
        assert!(orbit.limits().is_unrestricted());

        elapse(1).await;
        frame(&mut reset, &mut orbit);
        assert_eq!(reset.phase(), ResetPhase::Resetting);
        assert!(!orbit.limits().is_unrestricted());
    }

    #[tokio::test(start_paused = true)]
    async fn wheel_during_drag_keeps_limits_open() {
        let mut orbit = OrbitController::new(
            CameraState::new(0.0, 0.3, 1.0, [0.0; 3], 50f32.to_radians()),
            OrbitOptions {
                enable_zoom: true,
                ..OrbitOptions::default()
            },
            600.0,
        );
        let mut reset = reset_controller();

        orbit.on_mouse_button(winit::event::MouseButton::Left, true);
        reset.on_interaction_start(&mut orbit);
        if orbit.on_wheel(1.0) {
            reset.on_interaction_start(&mut orbit);
            reset.on_interaction_end();
        }

        elapse(2500).await;
        frame(&mut reset, &mut orbit);
        assert!(orbit.is_dragging());
        assert_eq!(reset.phase(), ResetPhase::Free);
        assert!(orbit.limits().is_unrestricted());
    }

    #[tokio::test(start_paused = true)]
    async fn start_cancels_pending_timer() {
        let mut orbit = orbit_at(0.3);
        let mut reset = reset_controller();

        reset.on_interaction_end();
        elapse(1000).await;
        reset.on_interaction_start(&mut orbit);
        elapse(5000).await;
        frame(&mut reset, &mut orbit);

        assert_eq!(reset.phase(), ResetPhase::Free);
        assert_relative_eq!(orbit.polar_angle(), 0.3);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_end_restarts_the_single_timer() {
        let mut orbit = orbit_at(0.3);
        let mut reset = reset_controller();

        reset.on_interaction_end();
        elapse(2000).await;
        reset.on_interaction_end();

        // The first timer would have fired at 2500 ms.
        elapse(600).await;
        frame(&mut reset, &mut orbit);
        assert_eq!(reset.phase(), ResetPhase::IdlePending);

        elapse(1900).await;
        frame(&mut reset, &mut orbit);
        assert_eq!(reset.phase(), ResetPhase::Resetting);
    }

    #[tokio::test(start_paused = true)]
    async fn first_step_from_low_angle() {
        let mut orbit = orbit_at(0.3);
        let mut reset = reset_controller();

        reset.on_interaction_end();
        elapse(2500).await;
        frame(&mut reset, &mut orbit);

        let expected = 0.3 + 0.03 * (FRAC_PI_2 - 0.3);
        assert_relative_eq!(orbit.limits().min_polar, expected, epsilon = 1e-6);
        assert_relative_eq!(orbit.limits().max_polar, expected, epsilon = 1e-6);
        assert_relative_eq!(orbit.polar_angle(), expected, epsilon = 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_converges_monotonically_then_frees() {
        for start in [0.3_f32, 2.8] {
            let mut orbit = orbit_at(start);
            let mut reset = reset_controller();

            reset.on_interaction_end();
            elapse(2500).await;

            let mut error = (orbit.polar_angle() - FRAC_PI_2).abs();
            let mut frames = 0;
            loop {
                frame(&mut reset, &mut orbit);
                frames += 1;
                assert!(frames < 1000, "reset never converged");

                let next = (orbit.polar_angle() - FRAC_PI_2).abs();
                if reset.phase() == ResetPhase::Free {
                    // The converging step reopens the limits before the
                    // control applies the last pin, so the pose stays put.
                    assert!(next <= error);
                    break;
                }
                assert_eq!(reset.phase(), ResetPhase::Resetting);
                assert!(next < error, "error grew from {error} to {next}");
                error = next;
            }

            let settled_error = (orbit.polar_angle() - FRAC_PI_2).abs();
            assert!(settled_error < RESET_EPSILON / (1.0 - RESET_BLEND) + 1e-6);
            assert!(orbit.limits().is_unrestricted());
            assert_ne!(reset.phase(), ResetPhase::Resetting);

            // Converged: further frames leave everything alone.
            let settled = orbit.polar_angle();
            for _ in 0..10 {
                frame(&mut reset, &mut orbit);
            }
            assert_eq!(reset.phase(), ResetPhase::Free);
            assert_eq!(orbit.polar_angle(), settled);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn drag_interrupts_reset() {
        let mut orbit = orbit_at(0.3);
        let mut reset = reset_controller();

        reset.on_interaction_end();
        elapse(2500).await;
        for _ in 0..20 {
            frame(&mut reset, &mut orbit);
        }
        let interrupted_at = orbit.polar_angle();
        assert!(interrupted_at > 0.3);

        reset.on_interaction_start(&mut orbit);
        for _ in 0..20 {
            frame(&mut reset, &mut orbit);
        }
        assert_eq!(reset.phase(), ResetPhase::Free);
        assert_eq!(orbit.polar_angle(), interrupted_at);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_controls_skip_the_step() {
        let mut orbit = orbit_at(0.3);
        let mut reset = reset_controller();

        reset.on_interaction_end();
        elapse(2500).await;
        reset.on_frame_tick::<OrbitController>(None);
        assert_eq!(reset.phase(), ResetPhase::Resetting);

        // Picks up where it left off once the controls exist.
        frame(&mut reset, &mut orbit);
        assert!(orbit.polar_angle() > 0.3);
    }

    #[test]
    fn config_follows_camera_settings() {
        let settings = CameraSettings {
            idle_reset_ms: 4000,
            reset_blend: 0.1,
            ..CameraSettings::default()
        };
        let config = IdleResetConfig::from(&settings);
        assert_eq!(config.delay, Duration::from_millis(4000));
        assert_eq!(config.blend, 0.1);
        assert_eq!(config.target_polar, RESET_TARGET_POLAR);
        assert_eq!(IdleResetConfig::from(&CameraSettings::default()), IdleResetConfig::default());
    }

    #[test]
    fn non_converging_settings_fall_back_to_defaults() {
        for (blend, epsilon) in [(0.0, 0.0), (2.5, -1.0), (f32::NAN, f32::NAN), (-0.1, 0.0)] {
            let settings = CameraSettings {
                reset_blend: blend,
                reset_epsilon: epsilon,
                ..CameraSettings::default()
            };
            let config = IdleResetConfig::from(&settings);
            assert_eq!(config.blend, RESET_BLEND);
            assert_eq!(config.epsilon, RESET_EPSILON);
        }

        let settings = CameraSettings {
            reset_blend: 1.0,
            ..CameraSettings::default()
        };
        assert_eq!(IdleResetConfig::from(&settings).blend, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_blend_setting_still_returns_to_free() {
        let settings = CameraSettings {
            reset_blend: 0.0,
            ..CameraSettings::default()
        };
        let mut orbit = orbit_at(0.3);
        let config = IdleResetConfig::from(&settings);
        let mut reset = IdleResetController::new(config, Handle::current());

        reset.on_interaction_end();
        elapse(2500).await;
        for _ in 0..2000 {
            frame(&mut reset, &mut orbit);
            if reset.phase() == ResetPhase::Free {
                break;
            }
        }
        assert_eq!(reset.phase(), ResetPhase::Free);
        assert!(orbit.limits().is_unrestricted());
        assert!((orbit.polar_angle() - FRAC_PI_2).abs() < 0.01);
    }
}
