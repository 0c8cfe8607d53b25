use std::fmt;

use crate::model::Model;
use crate::settings::SceneSettings;

use super::loader::{DecodedTexture, HdrImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetSlot {
    Mesh,
    BaseColor,
    Normal,
    Roughness,
    Metalness,
    Environment,
}

impl AssetSlot {
    pub const ALL: [AssetSlot; 6] = [
        AssetSlot::Mesh,
        AssetSlot::BaseColor,
        AssetSlot::Normal,
        AssetSlot::Roughness,
        AssetSlot::Metalness,
        AssetSlot::Environment,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AssetSlot::Mesh => "Mesh",
            AssetSlot::BaseColor => "Base color",
            AssetSlot::Normal => "Normal map",
            AssetSlot::Roughness => "Roughness",
            AssetSlot::Metalness => "Metalness",
            AssetSlot::Environment => "Environment",
        }
    }

    /// Color textures are sampled as sRGB, data textures as linear.
    pub fn is_srgb(self) -> bool {
        matches!(self, AssetSlot::BaseColor)
    }

    fn reference(self, scene: &SceneSettings) -> &str {
        match self {
            AssetSlot::Mesh => &scene.mesh,
            AssetSlot::BaseColor => &scene.base_color_map,
            AssetSlot::Normal => &scene.normal_map,
            AssetSlot::Roughness => &scene.roughness_map,
            AssetSlot::Metalness => &scene.metalness_map,
            AssetSlot::Environment => &scene.environment_map,
        }
    }
}

impl fmt::Display for AssetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssetStatus {
    NotLoaded,
    Loading,
    Loaded,
    Error(String),
}

#[derive(Debug, Clone)]
pub struct AssetInfo {
    pub slot: AssetSlot,
    pub reference: String,
    pub status: AssetStatus,
    /// Size summary once loaded, e.g. `1024x1024`.
    pub detail: String,
}

impl AssetInfo {
    pub fn new(slot: AssetSlot, reference: String) -> Self {
        Self {
            slot,
            reference,
            status: AssetStatus::NotLoaded,
            detail: String::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, AssetStatus::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.status, AssetStatus::Loaded)
    }

    pub fn has_error(&self) -> bool {
        matches!(self.status, AssetStatus::Error(_))
    }

    pub fn status_text(&self) -> String {
        match &self.status {
            AssetStatus::NotLoaded => "Not Loaded".to_string(),
            AssetStatus::Loading => "Loading...".to_string(),
            AssetStatus::Loaded => format!("Loaded ({})", self.detail),
            AssetStatus::Error(err) => format!("Error: {}", err),
        }
    }

    pub fn status_color(&self) -> egui::Color32 {
        match &self.status {
            AssetStatus::NotLoaded => egui::Color32::GRAY,
            AssetStatus::Loading => egui::Color32::YELLOW,
            AssetStatus::Loaded => egui::Color32::GREEN,
            AssetStatus::Error(_) => egui::Color32::RED,
        }
    }
}

pub enum AssetPayload {
    Mesh(Model),
    Texture(DecodedTexture),
    Environment(HdrImage),
}

impl AssetPayload {
    pub fn detail(&self) -> String {
        match self {
            AssetPayload::Mesh(model) => format!(
                "{} vertices, {} triangles",
                model.mesh.vertex_count(),
                model.mesh.triangle_count()
            ),
            AssetPayload::Texture(tex) => format!("{}x{}", tex.width, tex.height),
            AssetPayload::Environment(hdr) => format!("{}x{}", hdr.width, hdr.height),
        }
    }
}

pub enum AssetLoadResult {
    Success { slot: AssetSlot, payload: AssetPayload },
    Error { slot: AssetSlot, error: String },
}

pub struct AssetManager {
    pub assets: Vec<AssetInfo>,
}

impl AssetManager {
    pub fn new(scene: &SceneSettings) -> Self {
        Self {
            assets: AssetSlot::ALL
                .iter()
                .map(|&slot| AssetInfo::new(slot, scene.resolve(slot.reference(scene))))
                .collect(),
        }
    }

    pub fn get(&self, slot: AssetSlot) -> Option<&AssetInfo> {
        self.assets.iter().find(|a| a.slot == slot)
    }

    pub fn get_mut(&mut self, slot: AssetSlot) -> Option<&mut AssetInfo> {
        self.assets.iter_mut().find(|a| a.slot == slot)
    }

    /// Records the outcome and hands back the payload for upload.
    pub fn apply(&mut self, result: AssetLoadResult) -> Option<(AssetSlot, AssetPayload)> {
        match result {
            AssetLoadResult::Success { slot, payload } => {
                if let Some(info) = self.get_mut(slot) {
                    info.status = AssetStatus::Loaded;
                    info.detail = payload.detail();
                }
                Some((slot, payload))
            }
            AssetLoadResult::Error { slot, error } => {
                if let Some(info) = self.get_mut(slot) {
                    info.status = AssetStatus::Error(error);
                    info.detail.clear();
                }
                None
            }
        }
    }

    pub fn loading_count(&self) -> usize {
        self.assets.iter().filter(|a| a.is_loading()).count()
    }

    pub fn loaded_count(&self) -> usize {
        self.assets.iter().filter(|a| a.is_loaded()).count()
    }

    pub fn error_count(&self) -> usize {
        self.assets.iter().filter(|a| a.has_error()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_slot_is_tracked_with_resolved_reference() {
        let manager = AssetManager::new(&SceneSettings::default());
        assert_eq!(manager.assets.len(), AssetSlot::ALL.len());
        let env = manager.get(AssetSlot::Environment).unwrap();
        assert!(env.reference.ends_with("venice_sunset_1k.hdr"));
        assert!(env.reference.starts_with("assets"));
        assert_eq!(env.status, AssetStatus::NotLoaded);
    }

    #[test]
    fn apply_tracks_success_and_failure() {
        let mut manager = AssetManager::new(&SceneSettings::default());

        let payload = AssetPayload::Texture(DecodedTexture {
            rgba: vec![0; 16],
            width: 2,
            height: 2,
        });
        let applied = manager.apply(AssetLoadResult::Success {
            slot: AssetSlot::Normal,
            payload,
        });
        assert!(matches!(applied, Some((AssetSlot::Normal, AssetPayload::Texture(_)))));
        assert_eq!(manager.get(AssetSlot::Normal).unwrap().status_text(), "Loaded (2x2)");

        let applied = manager.apply(AssetLoadResult::Error {
            slot: AssetSlot::Mesh,
            error: "boom".into(),
        });
        assert!(applied.is_none());
        assert_eq!(manager.error_count(), 1);
        assert_eq!(manager.loaded_count(), 1);
        assert_eq!(
            manager.get(AssetSlot::Mesh).unwrap().status_color(),
            egui::Color32::RED
        );
    }
}
