use nalgebra_glm as glm;

/// Camera pose on a sphere around `target`, Y up.
///
/// `azimuth` turns around +Y starting at +Z toward +X; `polar` is measured
/// down from +Y, so π/2 is eye level.
#[derive(Debug, Clone)]
pub struct CameraState {
    pub azimuth: f32,
    pub polar: f32,
    pub distance: f32,
    pub target: [f32; 3],
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub default_azimuth: f32,
    pub default_polar: f32,
    pub default_distance: f32,
    pub default_target: [f32; 3],
}

impl CameraState {
    pub fn new(azimuth: f32, polar: f32, distance: f32, target: [f32; 3], fov_y: f32) -> Self {
        Self {
            azimuth,
            polar,
            distance,
            target,
            fov_y,
            default_azimuth: azimuth,
            default_polar: polar,
            default_distance: distance,
            default_target: target,
        }
    }

    /// Builds the pose that places the eye at `position` looking at `target`.
    pub fn looking_at(position: [f32; 3], target: [f32; 3], fov_degrees: f32) -> Self {
        let offset = glm::vec3(
            position[0] - target[0],
            position[1] - target[1],
            position[2] - target[2],
        );
        let distance = glm::length(&offset);
        let (azimuth, polar) = if distance == 0.0 {
            (0.0, std::f32::consts::FRAC_PI_2)
        } else {
            (
                offset.x.atan2(offset.z),
                (offset.y / distance).clamp(-1.0, 1.0).acos(),
            )
        };
        Self::new(azimuth, polar, distance, target, fov_degrees.to_radians())
    }

    pub fn eye(&self) -> [f32; 3] {
        let sin_polar = self.polar.sin();
        [
            self.target[0] + self.distance * sin_polar * self.azimuth.sin(),
            self.target[1] + self.distance * self.polar.cos(),
            self.target[2] + self.distance * sin_polar * self.azimuth.cos(),
        ]
    }

    pub fn view_matrix(&self) -> glm::Mat4 {
        let eye = self.eye();
        glm::look_at(
            &glm::vec3(eye[0], eye[1], eye[2]),
            &glm::vec3(self.target[0], self.target[1], self.target[2]),
            &glm::vec3(0.0, 1.0, 0.0),
        )
    }

    /// Depth maps to 0..1 as wgpu expects.
    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> glm::Mat4 {
        glm::perspective_rh_zo(aspect, self.fov_y, near, far)
    }

    pub fn reset(&mut self) {
        self.azimuth = self.default_azimuth;
        self.polar = self.default_polar;
        self.distance = self.default_distance;
        self.target = self.default_target;
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::looking_at([-0.7, 0.01, 0.0], [0.0, 0.0, 0.0], 50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn looking_at_round_trips_through_eye() {
        let state = CameraState::looking_at([-0.7, 0.01, 0.0], [0.0, 0.0, 0.0], 50.0);
        let eye = state.eye();
        assert_relative_eq!(eye[0], -0.7, epsilon = 1e-5);
        assert_relative_eq!(eye[1], 0.01, epsilon = 1e-5);
        assert_relative_eq!(eye[2], 0.0, epsilon = 1e-5);
        assert_relative_eq!(state.azimuth, -FRAC_PI_2, epsilon = 1e-6);
        assert!(state.polar < FRAC_PI_2);
    }

    #[test]
    fn eye_level_polar_keeps_eye_at_target_height() {
        let state = CameraState::new(0.3, FRAC_PI_2, 2.0, [0.0, 1.0, 0.0], 1.0);
        assert_relative_eq!(state.eye()[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn reset_restores_initial_pose() {
        let mut state = CameraState::default();
        let initial = (state.azimuth, state.polar);
        state.azimuth += 1.0;
        state.polar = 0.2;
        state.distance = 5.0;
        state.reset();
        assert_eq!((state.azimuth, state.polar), initial);
        assert_relative_eq!(state.distance, state.default_distance);
    }
}
