use std::f32::consts::{FRAC_PI_2, TAU};

use nalgebra_glm as glm;

use crate::settings::SceneSettings;

/// Axis and angle the imported scene is tipped by. The axis is not unit
/// length; see [`axis_angle_unnormalized`].
pub const SCENE_TILT_AXIS: [f32; 3] = [-0.47, 0.0, 0.0];
pub const SCENE_TILT_ANGLE: f32 = FRAC_PI_2;

/// Rotation matrix from the quaternion `(axis * sin(angle / 2), cos(angle / 2))`
/// without normalizing `axis`, expanded with the unit-quaternion formula.
///
/// For a short axis this is not a pure rotation: `(-0.47, 0, 0)` at π/2
/// tips about X by roughly 31° and shrinks Y and Z by about 0.91.
pub fn axis_angle_unnormalized(axis: [f32; 3], angle: f32) -> glm::Mat4 {
    let (s, w) = (angle / 2.0).sin_cos();
    let (x, y, z) = (axis[0] * s, axis[1] * s, axis[2] * s);
    let (x2, y2, z2) = (x + x, y + y, z + z);
    let (xx, xy, xz) = (x * x2, x * y2, x * z2);
    let (yy, yz, zz) = (y * y2, y * z2, z * z2);
    let (wx, wy, wz) = (w * x2, w * y2, w * z2);

    glm::mat3_to_mat4(&glm::Mat3::new(
        1.0 - (yy + zz),
        xy - wz,
        xz + wy,
        xy + wz,
        1.0 - (xx + zz),
        yz - wx,
        xz - wy,
        yz + wx,
        1.0 - (xx + yy),
    ))
}

/// Placement of the product model: the imported scene is offset and tipped
/// by [`SCENE_TILT_AXIS`], then sits in a scaled group that spins about +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    pub group_offset: glm::Vec3,
    pub scene_offset: glm::Vec3,
    pub scale: f32,
    /// Current group rotation about +Y, kept in `[0, TAU)`.
    pub spin: f32,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self::from(&SceneSettings::default())
    }
}

impl From<&SceneSettings> for ModelTransform {
    fn from(scene: &SceneSettings) -> Self {
        Self {
            group_offset: glm::Vec3::from(scene.group_offset),
            scene_offset: glm::Vec3::from(scene.scene_offset),
            scale: scene.model_scale,
            spin: 0.0,
        }
    }
}

impl ModelTransform {
    pub fn advance_spin(&mut self, dt: f32, speed: f32) {
        self.spin = (self.spin + dt * speed).rem_euclid(TAU);
    }

    pub fn matrix(&self) -> glm::Mat4 {
        let group = glm::translation(&self.group_offset);
        let group = glm::rotate_y(&group, self.spin);
        let group = glm::scale(&group, &glm::vec3(self.scale, self.scale, self.scale));

        let scene = glm::translation(&self.scene_offset)
            * axis_angle_unnormalized(SCENE_TILT_AXIS, SCENE_TILT_ANGLE);

        group * scene
    }

    /// Inverse-transpose of the model matrix, padded back to 4x4 for the
    /// uniform layout.
    pub fn normal_matrix(&self) -> glm::Mat4 {
        glm::mat3_to_mat4(&glm::inverse_transpose(glm::mat4_to_mat3(&self.matrix())))
    }
}
