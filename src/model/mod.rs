mod loader;
mod mesh;
mod transform;

pub use loader::load as load_gltf;
pub use mesh::*;
pub use transform::*;

use crate::error::ViewerError;

/// A loaded product model ready to be uploaded.
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// Reference the model was loaded from.
    pub name: String,
    pub mesh: MeshData,
}

impl Model {
    pub fn from_glb(name: impl Into<String>, bytes: &[u8]) -> Result<Self, ViewerError> {
        let name = name.into();
        let mesh = load_gltf(bytes).map_err(|e| {
            ViewerError::new("model-load")
                .with_arg("name", &name)
                .push_viewer(e)
        })?;
        Ok(Self { name, mesh })
    }
}
