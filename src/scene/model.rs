//! Loaded model: mesh nodes, materials and the root transform.

use std::sync::Arc;

use glam::{EulerRot, Mat4, Vec3};

use crate::assets::TextureData;
use crate::util::bounds::Aabb;

/// Root transform written by placement, the scroll timeline and idle spin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    /// Translation in world space.
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vec3,
}

impl Transform {
    /// Model-to-world matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_euler(
                EulerRot::XYZ,
                self.rotation.x,
                self.rotation.y,
                self.rotation.z,
            )
    }
}

/// Triangle geometry in node-local space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Geometry {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, one per position.
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates, one per position (zeros when the source had none).
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Bounds of the vertex positions, `None` for empty geometry.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().map(|p| Vec3::from_array(*p)))
    }
}

/// Physically based surface, lit by every scene light.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    /// Linear RGBA multiplier.
    pub base_color: [f32; 4],
    /// 0 = mirror, 1 = fully diffuse.
    pub roughness: f32,
    /// 0 = dielectric, 1 = metal.
    pub metalness: f32,
    /// Color map.
    pub map: Option<Arc<TextureData>>,
    /// Tangent-space normal map.
    pub normal_map: Option<Arc<TextureData>>,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            base_color: [1.0; 4],
            roughness: 1.0,
            metalness: 0.0,
            map: None,
            normal_map: None,
        }
    }
}

/// Surface material.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Lit PBR surface.
    Standard(StandardMaterial),
    /// Flat color, ignores lights.
    Unlit {
        /// Linear RGBA color.
        base_color: [f32; 4],
        /// Color map.
        map: Option<Arc<TextureData>>,
    },
}

impl Default for Material {
    fn default() -> Self {
        Self::Standard(StandardMaterial::default())
    }
}

/// One drawable mesh with its position inside the model.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshNode {
    /// Node name from the source asset, if any.
    pub name: Option<String>,
    /// Node-to-model transform (the node hierarchy flattened).
    pub local: Mat4,
    /// Triangle geometry.
    pub geometry: Geometry,
    /// Surface material.
    pub material: Material,
}

/// A loaded model: flat list of mesh nodes under one root transform.
///
/// The centering offset is the root translation that puts the model's
/// bounding-box center on the origin. It is computed once when the model is
/// built and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    meshes: Vec<MeshNode>,
    transform: Transform,
    centering_offset: Vec3,
}

impl Model {
    /// Model with an identity root transform and no centering.
    #[must_use]
    pub fn new(meshes: Vec<MeshNode>) -> Self {
        Self {
            meshes,
            transform: Transform::default(),
            centering_offset: Vec3::ZERO,
        }
    }

    /// Model whose root translation cancels its bounding-box center.
    #[must_use]
    pub fn centered(meshes: Vec<MeshNode>) -> Self {
        let mut model = Self::new(meshes);
        let center = model.local_bounds().map_or(Vec3::ZERO, |b| b.center());
        model.centering_offset = -center;
        model.transform.position = -center;
        model
    }

    /// Mesh nodes.
    #[must_use]
    pub fn meshes(&self) -> &[MeshNode] {
        &self.meshes
    }

    /// Root transform.
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable root transform.
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Translation that centered the model at load time.
    #[must_use]
    pub fn centering_offset(&self) -> Vec3 {
        self.centering_offset
    }

    /// Bounds in model space, before the root transform.
    #[must_use]
    pub fn local_bounds(&self) -> Option<Aabb> {
        self.meshes
            .iter()
            .filter_map(|m| m.geometry.bounds().map(|b| b.transformed(&m.local)))
            .reduce(|a, b| a.union(&b))
    }

    /// Bounds in world space under the current root transform.
    #[must_use]
    pub fn world_bounds(&self) -> Option<Aabb> {
        let root = self.transform.matrix();
        self.local_bounds().map(|b| b.transformed(&root))
    }
}
