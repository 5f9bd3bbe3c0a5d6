//! Post-load normalization: material override, centering, placement.

use std::sync::Arc;

use glam::Vec3;
use log::info;

use super::TextureData;
use crate::options::PlacementOptions;
use crate::scene::{Material, MeshNode, Model, StandardMaterial};

/// Textures bound to every mesh after loading.
#[derive(Debug, Clone, Default)]
pub struct ModelTextures {
    /// Color map.
    pub color: Option<Arc<TextureData>>,
    /// Normal map.
    pub normal: Option<Arc<TextureData>>,
}

/// Turn decoded meshes into a placed model.
///
/// 1. Standard materials are forced fully metallic and mirror-smooth, then
///    every mesh material is replaced by a default standard material bound to
///    `textures`.
/// 2. The model is centered on its bounding box.
/// 3. `placement` is applied on top of the centered position.
#[must_use]
pub fn normalize(
    mut meshes: Vec<MeshNode>,
    textures: &ModelTextures,
    placement: &PlacementOptions,
) -> Model {
    for mesh in &mut meshes {
        if let Material::Standard(standard) = &mut mesh.material {
            standard.roughness = 0.0;
            standard.metalness = 1.0;
        }
        mesh.material = Material::Standard(StandardMaterial {
            map: textures.color.clone(),
            normal_map: textures.normal.clone(),
            ..StandardMaterial::default()
        });
    }

    let mut model = Model::centered(meshes);
    let transform = model.transform_mut();
    transform.position += Vec3::from_array(placement.offset);
    transform.rotation = Vec3::from_array(placement.rotation);

    info!(
        "Normalized model: {} meshes, centering offset {:?}",
        model.meshes().len(),
        model.centering_offset().to_array()
    );
    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ColorSpace;
    use crate::scene::box_mesh;

    fn textures() -> ModelTextures {
        ModelTextures {
            color: Some(Arc::new(TextureData::solid("c", [255; 4], ColorSpace::Srgb))),
            normal: Some(Arc::new(TextureData::solid(
                "n",
                [128, 128, 255, 255],
                ColorSpace::Linear,
            ))),
        }
    }

    #[test]
    fn materials_are_replaced_with_textured_defaults() {
        let mut mesh = box_mesh(Vec3::ZERO, Vec3::ONE);
        mesh.material = Material::Standard(StandardMaterial {
            base_color: [1.0, 0.0, 0.0, 1.0],
            roughness: 0.4,
            metalness: 0.3,
            map: None,
            normal_map: None,
        });
        let mut unlit = box_mesh(Vec3::ZERO, Vec3::ONE);
        unlit.material = Material::Unlit {
            base_color: [0.0, 1.0, 0.0, 1.0],
            map: None,
        };

        let model = normalize(vec![mesh, unlit], &textures(), &PlacementOptions::default());
        for mesh in model.meshes() {
            let Material::Standard(m) = &mesh.material else {
                panic!("expected standard material");
            };
            assert_eq!(m.base_color, [1.0; 4]);
            assert_eq!(m.roughness, 1.0);
            assert_eq!(m.metalness, 0.0);
            assert_eq!(m.map.as_ref().unwrap().label, "c");
            assert_eq!(m.normal_map.as_ref().unwrap().color_space, ColorSpace::Linear);
        }
    }

    #[test]
    fn centered_before_placement() {
        let meshes = vec![box_mesh(Vec3::new(4.0, 4.0, 4.0), Vec3::new(6.0, 8.0, 10.0))];
        let placement = PlacementOptions {
            offset: [3.0, -2.0, 0.0],
            rotation: [0.0, -2.0, 0.0],
        };
        let model = normalize(meshes, &ModelTextures::default(), &placement);

        assert_eq!(model.centering_offset(), Vec3::new(-5.0, -6.0, -7.0));
        let t = model.transform();
        assert_eq!(t.position, Vec3::new(-2.0, -8.0, -7.0));
        assert_eq!(t.rotation, Vec3::new(0.0, -2.0, 0.0));

        // Pre-offset center sits on the origin.
        let pre_offset = model.local_bounds().unwrap().center() + model.centering_offset();
        assert!(pre_offset.length() < 1e-5);
    }
}
