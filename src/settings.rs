use crate::CONFY_APP_NAME;

use log::warn;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

fn load_section<T: Default + DeserializeOwned + Serialize>(name: &str) -> T {
    match confy::load(CONFY_APP_NAME, name) {
        Ok(section) => section,
        Err(e) => {
            warn!("Failed to load '{name}' settings, using defaults: {e}");
            T::default()
        }
    }
}

fn store_section<T: Serialize>(name: &str, section: &T) {
    if let Err(e) = confy::store(CONFY_APP_NAME, name, section) {
        warn!("Failed to store '{name}' settings: {e}");
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub show_grid: bool,
    pub show_ground: bool,
    pub spin_model: bool,
    /// Radians per second around +Y.
    pub spin_speed: f32,
    pub show_panel: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_ground: true,
            spin_model: true,
            spin_speed: 0.5,
            show_panel: false,
        }
    }
}

impl DisplaySettings {
    pub fn load() -> Self {
        load_section("display")
    }

    pub fn save(&self) {
        store_section("display", self);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSettings {
    /// Prefix for relative asset paths. URLs ignore it.
    pub asset_root: String,
    pub mesh: String,
    pub base_color_map: String,
    pub normal_map: String,
    pub roughness_map: String,
    pub metalness_map: String,
    pub environment_map: String,
    pub model_scale: f32,
    pub group_offset: [f32; 3],
    pub scene_offset: [f32; 3],
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            asset_root: "assets".to_string(),
            mesh: "mesh.glb".to_string(),
            base_color_map: "textures/base.webp".to_string(),
            normal_map: "textures/normalmap.webp".to_string(),
            roughness_map: "textures/roughness.webp".to_string(),
            metalness_map: "textures/metalness.webp".to_string(),
            environment_map: "textures/map/venice_sunset_1k.hdr".to_string(),
            model_scale: 1.5,
            group_offset: [0.0, 0.01, -0.01],
            scene_offset: [0.0, -0.04, -0.01],
        }
    }
}

impl SceneSettings {
    pub fn load() -> Self {
        load_section("scene")
    }

    /// Points the mesh at a reference given on the command line. Relative
    /// paths are taken from the working directory, not the asset root.
    pub fn override_mesh(&mut self, reference: &str) {
        let is_url = reference.contains("://");
        self.mesh = if is_url {
            reference.to_string()
        } else {
            std::path::absolute(reference)
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|_| reference.to_string())
        };
    }

    /// Joins `reference` onto the asset root unless it is a URL or absolute path.
    pub fn resolve(&self, reference: &str) -> String {
        if reference.contains("://")
            || std::path::Path::new(reference).is_absolute()
            || self.asset_root.is_empty()
        {
            return reference.to_string();
        }
        std::path::Path::new(&self.asset_root)
            .join(reference)
            .to_string_lossy()
            .into_owned()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DirectionalLightSettings {
    /// The light shines from here toward the origin.
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightingSettings {
    pub exposure: f32,
    pub environment_intensity: f32,
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub directional_lights: Vec<DirectionalLightSettings>,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            exposure: 0.9,
            environment_intensity: 1.0,
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 1.0,
            directional_lights: vec![
                DirectionalLightSettings {
                    position: [0.5, 1.0, 0.0],
                    color: [1.0, 1.0, 1.0],
                    intensity: 0.05,
                },
                DirectionalLightSettings {
                    position: [-0.5, 1.0, 0.0],
                    color: [1.0, 1.0, 1.0],
                    intensity: 0.05,
                },
            ],
        }
    }
}

impl LightingSettings {
    pub fn load() -> Self {
        load_section("lighting")
    }

    pub fn save(&self) {
        store_section("lighting", self);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSettings {
    /// -1.0 ..= 1.0
    pub brightness: f32,
    /// -1.0 ..= 1.0
    pub contrast: f32,
}

impl Default for PostSettings {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 0.2,
        }
    }
}

impl PostSettings {
    pub fn load() -> Self {
        load_section("post")
    }

    pub fn save(&self) {
        store_section("post", self);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub idle_reset_ms: u64,
    pub reset_blend: f32,
    pub reset_epsilon: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [-0.7, 0.01, 0.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 50.0,
            near: 0.1,
            far: 2000.0,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            enable_zoom: false,
            enable_pan: false,
            idle_reset_ms: 2500,
            reset_blend: 0.03,
            reset_epsilon: 0.001,
        }
    }
}

impl CameraSettings {
    pub fn load() -> Self {
        load_section("camera")
    }
}

// Aggregate struct for convenience
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub display: DisplaySettings,
    pub scene: SceneSettings,
    pub lighting: LightingSettings,
    pub post: PostSettings,
    pub camera: CameraSettings,
}

impl Settings {
    pub fn load() -> Self {
        Self {
            display: DisplaySettings::load(),
            scene: SceneSettings::load(),
            lighting: LightingSettings::load(),
            post: PostSettings::load(),
            camera: CameraSettings::load(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_references_land_under_asset_root() {
        let scene = SceneSettings::default();
        let resolved = scene.resolve("mesh.glb");
        assert_eq!(
            std::path::Path::new(&resolved),
            std::path::Path::new("assets").join("mesh.glb")
        );
    }

    #[test]
    fn urls_are_left_alone() {
        let scene = SceneSettings::default();
        assert_eq!(
            scene.resolve("https://cdn.example.com/mesh.glb"),
            "https://cdn.example.com/mesh.glb"
        );
    }

    #[test]
    fn empty_root_keeps_reference() {
        let scene = SceneSettings {
            asset_root: String::new(),
            ..SceneSettings::default()
        };
        assert_eq!(scene.resolve("textures/base.webp"), "textures/base.webp");
    }

    #[test]
    fn mesh_override_ignores_asset_root() {
        let mut scene = SceneSettings::default();
        scene.override_mesh("models/shoe.glb");
        let resolved = scene.resolve(&scene.mesh);
        assert!(std::path::Path::new(&resolved).is_absolute());
        assert!(resolved.ends_with("shoe.glb"));

        scene.override_mesh("https://cdn.example.com/shoe.glb");
        assert_eq!(scene.resolve(&scene.mesh), "https://cdn.example.com/shoe.glb");
    }

    #[test]
    fn camera_defaults_match_idle_reset_constants() {
        let camera = CameraSettings::default();
        assert_eq!(
            camera.idle_reset_ms,
            crate::renderer::camera::IDLE_RESET_DELAY.as_millis() as u64
        );
        assert_eq!(camera.reset_blend, crate::renderer::camera::RESET_BLEND);
        assert_eq!(camera.reset_epsilon, crate::renderer::camera::RESET_EPSILON);
        assert!(!camera.enable_zoom);
        assert!(!camera.enable_pan);
    }
}
