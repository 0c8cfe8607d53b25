use bytemuck::{Pod, Zeroable};
use nalgebra_glm as glm;

use super::PbrMaterial;

/// Per-object uniform, laid out to match `ObjectUniform` in mesh.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    pub normal_scale: [f32; 2],
    pub roughness: f32,
    pub metalness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub occlusion_strength: f32,
    pub light_map_intensity: f32,
    pub use_maps: f32,
    pub _padding: [f32; 3],
}

impl ObjectUniform {
    pub fn new(model: &glm::Mat4, normal_matrix: &glm::Mat4, material: &PbrMaterial) -> Self {
        Self {
            model: (*model).into(),
            normal_matrix: (*normal_matrix).into(),
            base_color: material.base_color,
            normal_scale: material.normal_scale,
            roughness: material.roughness,
            metalness: material.metalness,
            clearcoat: material.clearcoat,
            clearcoat_roughness: material.clearcoat_roughness,
            occlusion_strength: material.occlusion_strength,
            light_map_intensity: material.light_map_intensity,
            use_maps: if material.use_maps { 1.0 } else { 0.0 },
            _padding: [0.0; 3],
        }
    }

    /// Untransformed object, e.g. the ground plane.
    pub fn fixed(material: &PbrMaterial) -> Self {
        let identity = glm::Mat4::identity();
        Self::new(&identity, &identity, material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_uniform_aligned() {
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 192);
        assert_eq!(std::mem::size_of::<ObjectUniform>() % 16, 0);
    }

    #[test]
    fn matrices_are_column_major() {
        let model = glm::translation(&glm::vec3(1.0, 2.0, 3.0));
        let u = ObjectUniform::new(&model, &glm::Mat4::identity(), &PbrMaterial::product());
        assert_eq!(u.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(u.use_maps, 1.0);
    }
}
