use bytemuck::{Pod, Zeroable};
use nalgebra_glm as glm;

use crate::settings::LightingSettings;

pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
}

impl FrameUniform {
    pub fn new(view_proj: &glm::Mat4, eye: [f32; 3]) -> Self {
        Self {
            view_proj: (*view_proj).into(),
            camera_position: [eye[0], eye[1], eye[2], 1.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct DirectionalLightUniform {
    /// Unit vector toward the light.
    pub direction: [f32; 4],
    /// Color premultiplied by intensity.
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LightingUniform {
    pub ambient: [f32; 4],
    pub lights: [DirectionalLightUniform; MAX_DIRECTIONAL_LIGHTS],
    pub light_count: u32,
    pub environment_intensity: f32,
    pub environment_max_lod: f32,
    pub _padding: f32,
}

impl LightingUniform {
    pub fn new(settings: &LightingSettings, environment_max_lod: f32) -> Self {
        let mut lights = [DirectionalLightUniform::default(); MAX_DIRECTIONAL_LIGHTS];
        let mut count = 0;
        let usable = settings
            .directional_lights
            .iter()
            .filter(|light| light.position.iter().any(|&c| c != 0.0))
            .take(MAX_DIRECTIONAL_LIGHTS);
        for light in usable {
            let direction = glm::normalize(&glm::Vec3::from(light.position));
            let [r, g, b] = light.color.map(|c| c * light.intensity);
            lights[count] = DirectionalLightUniform {
                direction: [direction.x, direction.y, direction.z, 0.0],
                color: [r, g, b, 1.0],
            };
            count += 1;
        }

        let [r, g, b] = settings.ambient_color.map(|c| c * settings.ambient_intensity);
        Self {
            ambient: [r, g, b, 1.0],
            lights,
            light_count: count as u32,
            environment_intensity: settings.environment_intensity,
            environment_max_lod,
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DirectionalLightSettings;
    use approx::assert_relative_eq;

    #[test]
    fn layouts_match_shader() {
        assert_eq!(size_of::<FrameUniform>(), 80);
        assert_eq!(size_of::<LightingUniform>(), 160);
    }

    #[test]
    fn default_lights_point_at_origin_from_above() {
        let u = LightingUniform::new(&LightingSettings::default(), 8.0);
        assert_eq!(u.light_count, 2);
        let d = u.lights[0].direction;
        assert_relative_eq!(d[0], 0.5 / 1.25f32.sqrt(), epsilon = 1e-6);
        assert_relative_eq!(d[1], 1.0 / 1.25f32.sqrt(), epsilon = 1e-6);
        assert_relative_eq!(u.lights[1].color[0], 0.05, epsilon = 1e-6);
        assert_eq!(u.ambient, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(u.environment_max_lod, 8.0);
    }

    #[test]
    fn extra_and_degenerate_lights_are_dropped() {
        let light = DirectionalLightSettings {
            position: [0.0, 1.0, 0.0],
            color: [1.0; 3],
            intensity: 1.0,
        };
        let mut settings = LightingSettings {
            directional_lights: vec![light; 6],
            ..LightingSettings::default()
        };
        settings.directional_lights[0].position = [0.0; 3];
        let u = LightingUniform::new(&settings, 0.0);
        assert_eq!(u.light_count, MAX_DIRECTIONAL_LIGHTS as u32);
    }
}
