use super::color::{LIGHT_GRAY, srgb8_to_linear};

/// Metallic-roughness material with the clearcoat and map-derived terms
/// the product shader understands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PbrMaterial {
    /// Linear RGBA, multiplied with the base-color map.
    pub base_color: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
    pub normal_scale: [f32; 2],
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    /// Occlusion read from the base-color map's red channel.
    pub occlusion_strength: f32,
    /// Light map read from the normal texture.
    pub light_map_intensity: f32,
    /// Sample the bound material maps. Off for untextured surfaces.
    pub use_maps: bool,
}

impl Default for PbrMaterial {
    fn default() -> Self {
        Self {
            base_color: [1.0; 4],
            roughness: 1.0,
            metalness: 0.0,
            normal_scale: [1.0, 1.0],
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            occlusion_strength: 0.0,
            light_map_intensity: 0.0,
            use_maps: false,
        }
    }
}

impl PbrMaterial {
    pub fn product() -> Self {
        Self {
            base_color: [1.0; 4],
            roughness: 0.6,
            metalness: 0.6,
            normal_scale: [0.3, 0.1],
            clearcoat: 1.0,
            clearcoat_roughness: 1.0,
            occlusion_strength: 1.2,
            light_map_intensity: 1.0,
            use_maps: true,
        }
    }

    pub fn ground() -> Self {
        let [r, g, b] = srgb8_to_linear(LIGHT_GRAY);
        Self {
            base_color: [r, g, b, 1.0],
            ..Self::default()
        }
    }
}
