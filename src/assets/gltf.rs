//! glTF 2.0 decoding into flat mesh nodes.

use glam::{Mat4, Vec3};
use log::debug;

use super::source::{resolve_relative, AssetSource};
use super::LoadError;
use crate::scene::{Geometry, Material, MeshNode, StandardMaterial};

/// Required extensions that need a mesh decompressor.
const COMPRESSION_EXTENSIONS: [&str; 3] = [
    "KHR_draco_mesh_compression",
    "EXT_meshopt_compression",
    "KHR_meshopt_compression",
];

/// Decode a `.gltf` or `.glb` document. External buffers are fetched from
/// `source` relative to `path`.
pub(crate) fn decode(
    bytes: &[u8],
    path: &str,
    source: &dyn AssetSource,
) -> Result<Vec<MeshNode>, LoadError> {
    let gltf::Gltf { document, mut blob } =
        gltf::Gltf::from_slice_without_validation(bytes)
            .map_err(|e| LoadError::decode(path, e))?;

    if let Some(ext) = document
        .extensions_required()
        .find(|ext| COMPRESSION_EXTENSIONS.contains(ext))
    {
        return Err(LoadError::DecoderConfig {
            path: path.to_owned(),
            extension: ext.to_owned(),
        });
    }
    let document = gltf::Document::from_json(document.into_json())
        .map_err(|e| LoadError::decode(path, e))?;

    let mut buffers = Vec::new();
    for buffer in document.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => blob.take().ok_or_else(|| {
                LoadError::decode(path, "missing binary chunk")
            })?,
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                return Err(LoadError::decode(
                    path,
                    "embedded data URIs are not supported; use .glb or an external .bin",
                ));
            }
            gltf::buffer::Source::Uri(uri) => {
                source.fetch(&resolve_relative(path, uri))?
            }
        };
        if data.len() < buffer.length() {
            return Err(LoadError::decode(
                path,
                format!(
                    "buffer {} has {} bytes, expected {}",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                ),
            ));
        }
        buffers.push(data);
    }

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| LoadError::decode(path, "document has no scenes"))?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        collect_node(&node, &buffers, Mat4::IDENTITY, path, &mut meshes)?;
    }
    debug!("Decoded {} mesh primitives from {path}", meshes.len());
    Ok(meshes)
}

/// Recursively flattens the node hierarchy into mesh nodes.
fn collect_node(
    node: &gltf::Node,
    buffers: &[Vec<u8>],
    parent: Mat4,
    path: &str,
    out: &mut Vec<MeshNode>,
) -> Result<(), LoadError> {
    let local = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                debug!(
                    "Skipping {:?} primitive in mesh {:?}",
                    primitive.mode(),
                    mesh.name()
                );
                continue;
            }
            out.push(MeshNode {
                name: mesh.name().map(str::to_owned),
                local,
                geometry: read_geometry(&primitive, buffers, path)?,
                material: read_material(&primitive.material()),
            });
        }
    }

    for child in node.children() {
        collect_node(&child, buffers, local, path, out)?;
    }
    Ok(())
}

fn read_geometry(
    primitive: &gltf::Primitive,
    buffers: &[Vec<u8>],
    path: &str,
) -> Result<Geometry, LoadError> {
    let reader =
        primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| LoadError::decode(path, "mesh primitive has no positions"))?
        .collect();
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    if let Some(bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
        return Err(LoadError::decode(
            path,
            format!("index {bad} out of range for {} vertices", positions.len()),
        ));
    }
    let normals = match reader.read_normals() {
        Some(normals) => normals.collect(),
        None => compute_normals(&positions, &indices),
    };
    let uvs = match reader.read_tex_coords(0) {
        Some(uvs) => uvs.into_f32().collect(),
        None => vec![[0.0, 0.0]; positions.len()],
    };

    Ok(Geometry {
        positions,
        normals,
        uvs,
        indices,
    })
}

fn read_material(material: &gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    if material.unlit() {
        return Material::Unlit {
            base_color: pbr.base_color_factor(),
            map: None,
        };
    }
    Material::Standard(StandardMaterial {
        base_color: pbr.base_color_factor(),
        roughness: pbr.roughness_factor(),
        metalness: pbr.metallic_factor(),
        map: None,
        normal_map: None,
    })
}

/// Area-weighted vertex normals for geometry that ships without them.
fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        let pa = Vec3::from_array(positions[a]);
        let face = (Vec3::from_array(positions[b]) - pa)
            .cross(Vec3::from_array(positions[c]) - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.normalize_or(Vec3::Y).to_array())
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::assets::MemorySource;

    /// One triangle (0,0,0) (2,0,0) (0,2,0) under a node translated by
    /// `translation`, with a red standard material.
    pub(crate) fn triangle_source(
        dir: &str,
        translation: [f32; 3],
        extra: &str,
    ) -> MemorySource {
        let mut bin = Vec::new();
        for v in [[0.0f32, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]] {
            for c in v {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in [0u16, 1, 2] {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        bin.extend_from_slice(&[0, 0]);

        let [tx, ty, tz] = translation;
        let json = format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  {extra}
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [{{ "mesh": 0, "translation": [{tx}, {ty}, {tz}] }}],
  "meshes": [{{ "name": "tri", "primitives": [
    {{ "attributes": {{ "POSITION": 0 }}, "indices": 1, "material": 0 }}
  ] }}],
  "materials": [{{ "pbrMetallicRoughness": {{
    "baseColorFactor": [1.0, 0.0, 0.0, 1.0],
    "metallicFactor": 0.2,
    "roughnessFactor": 0.7
  }} }}],
  "buffers": [{{ "uri": "tri.bin", "byteLength": 44 }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [2.0, 2.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ]
}}"#
        );
        MemorySource::new()
            .with(&format!("{dir}/tri.gltf"), json.into_bytes())
            .with(&format!("{dir}/tri.bin"), bin)
    }

    #[test]
    fn decodes_triangle_with_node_transform() {
        let source = triangle_source("astro", [10.0, 0.0, 0.0], "");
        let bytes = source.fetch("astro/tri.gltf").unwrap();
        let meshes = decode(&bytes, "astro/tri.gltf", &source).unwrap();
        assert_eq!(meshes.len(), 1);

        let mesh = &meshes[0];
        assert_eq!(mesh.name.as_deref(), Some("tri"));
        assert_eq!(mesh.geometry.indices, vec![0, 1, 2]);
        assert_eq!(mesh.geometry.uvs.len(), 3);
        let n = Vec3::from_array(mesh.geometry.normals[0]);
        assert!((n - Vec3::Z).length() < 1e-6);
        assert_eq!(mesh.local.transform_point3(Vec3::ZERO), Vec3::new(10.0, 0.0, 0.0));

        match &mesh.material {
            Material::Standard(m) => {
                assert_eq!(m.base_color, [1.0, 0.0, 0.0, 1.0]);
                assert!((m.roughness - 0.7).abs() < 1e-6);
                assert!((m.metalness - 0.2).abs() < 1e-6);
            }
            other => panic!("unexpected material {other:?}"),
        }
    }

    #[test]
    fn compressed_meshes_need_a_decoder() {
        let source = triangle_source(
            "astro",
            [0.0; 3],
            r#""extensionsUsed": ["KHR_draco_mesh_compression"],
  "extensionsRequired": ["KHR_draco_mesh_compression"],"#,
        );
        let bytes = source.fetch("astro/tri.gltf").unwrap();
        let err = decode(&bytes, "astro/tri.gltf", &source).unwrap_err();
        assert!(matches!(
            err,
            LoadError::DecoderConfig { ref extension, .. } if extension == "KHR_draco_mesh_compression"
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn missing_buffer_is_a_network_error() {
        let source = triangle_source("astro", [0.0; 3], "");
        let bytes = source.fetch("astro/tri.gltf").unwrap();
        let only_json = MemorySource::new().with("astro/tri.gltf", bytes.clone());
        let err = decode(&bytes, "astro/tri.gltf", &only_json).unwrap_err();
        assert!(matches!(err, LoadError::Network { ref path, .. } if path == "astro/tri.bin"));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let source = MemorySource::new();
        let err = decode(b"{ not json", "broken.gltf", &source).unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
    }

    #[test]
    fn computed_normals_follow_winding() {
        let normals = compute_normals(
            &[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
            &[0, 1, 2],
        );
        for n in normals {
            assert!((Vec3::from_array(n) - Vec3::Y).length() < 1e-6);
        }
    }
}
