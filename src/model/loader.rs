use log::debug;
use nalgebra_glm as glm;

use super::mesh::{MeshData, compute_normals};
use crate::error::ViewerError;

/// Reads a GLB (or a glTF with embedded buffers) and flattens every
/// triangle primitive of its scene into one mesh, node transforms baked in.
pub fn load(bytes: &[u8]) -> Result<MeshData, ViewerError> {
    let (document, buffers, _images) = gltf::import_slice(bytes)?;

    let mut mesh = MeshData::default();
    let identity = glm::Mat4::identity();

    match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                visit_node(&node, &identity, &buffers, &mut mesh);
            }
        }
        None => {
            for gltf_mesh in document.meshes() {
                append_mesh(&gltf_mesh, &identity, &buffers, &mut mesh);
            }
        }
    }

    if mesh.is_empty() {
        return Err(ViewerError::new("gltf-no-triangles"));
    }
    if let Some((min, max)) = mesh.bounds() {
        debug!(
            "Loaded glTF mesh: {} vertices, {} triangles, bounds {:?} .. {:?}",
            mesh.vertex_count(),
            mesh.triangle_count(),
            min,
            max
        );
    }
    Ok(mesh)
}

fn visit_node(
    node: &gltf::Node<'_>,
    parent: &glm::Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut MeshData,
) {
    let local = node.transform().matrix();
    let world = parent * glm::make_mat4(local.as_flattened());

    if let Some(mesh) = node.mesh() {
        append_mesh(&mesh, &world, buffers, out);
    }
    for child in node.children() {
        visit_node(&child, &world, buffers, out);
    }
}

fn append_mesh(
    mesh: &gltf::Mesh<'_>,
    world: &glm::Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut MeshData,
) {
    let normal_matrix = glm::inverse_transpose(glm::mat4_to_mat3(world));

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            debug!(
                "Skipping primitive {} of mesh {:?}: mode {:?}",
                primitive.index(),
                mesh.name(),
                primitive.mode()
            );
            continue;
        }

        let reader =
            primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let positions: Vec<[f32; 3]> = positions
            .map(|p| {
                let v = world * glm::vec4(p[0], p[1], p[2], 1.0);
                [v.x, v.y, v.z]
            })
            .collect();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let normals: Vec<[f32; 3]> = match reader.read_normals() {
            Some(normals) => normals
                .map(|n| {
                    let v = normal_matrix * glm::vec3(n[0], n[1], n[2]);
                    let v = if glm::length2(&v) > 0.0 {
                        glm::normalize(&v)
                    } else {
                        glm::vec3(0.0, 1.0, 0.0)
                    };
                    [v.x, v.y, v.z]
                })
                .collect(),
            None => compute_normals(&positions, &indices),
        };

        let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
            Some(uvs) => uvs.into_f32().collect(),
            None => vec![[0.0, 0.0]; positions.len()],
        };

        out.append(MeshData {
            positions,
            normals,
            uvs,
            indices,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// One triangle in the XY plane, no normals, node translated by +1 X.
    fn triangle_glb() -> Vec<u8> {
        let json = r#"{
            "asset": {"version": "2.0"},
            "scene": 0,
            "scenes": [{"nodes": [0]}],
            "nodes": [{"mesh": 0, "translation": [1.0, 0.0, 0.0]}],
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "indices": 1}]}],
            "buffers": [{"byteLength": 42}],
            "bufferViews": [
                {"buffer": 0, "byteOffset": 0, "byteLength": 36},
                {"buffer": 0, "byteOffset": 36, "byteLength": 6}
            ],
            "accessors": [
                {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                 "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]},
                {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}
            ]
        }"#;

        let mut bin = Vec::new();
        for p in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            for c in p {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in [0u16, 1, 2] {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let mut json = json.as_bytes().to_vec();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(b"glTF");
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"JSON");
        glb.extend_from_slice(&json);
        glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"BIN\0");
        glb.extend_from_slice(&bin);
        glb
    }

    #[test]
    fn loads_triangle_with_node_transform() {
        let mesh = load(&triangle_glb()).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.positions[0], [1.0, 0.0, 0.0]);
        assert_eq!(mesh.positions[2], [1.0, 1.0, 0.0]);
        assert_eq!(mesh.uvs, vec![[0.0, 0.0]; 3]);
        for n in &mesh.normals {
            assert_relative_eq!(n[2], 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn garbage_is_an_error() {
        let err = load(b"definitely not a model").unwrap_err();
        assert_eq!(err.key, "gltf::Error");
    }
}
