//! Authoritative scene: camera, lights and at most one model.
//!
//! The model slot starts empty and is filled exactly once, when the asset
//! pipeline completes. Until then (or forever, if loading fails) the scene
//! renders with its lights and camera only.

mod light;
mod model;

pub use light::Light;
pub use model::{
    Geometry, Material, MeshNode, Model, StandardMaterial, Transform,
};

#[cfg(test)]
pub(crate) use model::tests::box_mesh;

use crate::camera::Camera;
use crate::error::EngineError;
use crate::options::Options;

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// The authoritative scene. Owns the camera, the lights and the model.
#[derive(Debug, Clone)]
pub struct Scene {
    camera: Camera,
    lights: Vec<Light>,
    model: Option<Model>,
}

impl Scene {
    /// Scene with the camera and lights from `options` and no model. The
    /// camera aspect comes from the configured window size until the first
    /// resize.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        let width = options.viewport.width.max(1) as f32;
        let height = options.viewport.height.max(1) as f32;
        Self {
            camera: Camera::from_options(&options.camera, width / height),
            lights: Light::from_options(&options.lighting),
            model: None,
        }
    }

    // -- Model --

    /// Attach the loaded model. Fails if one is already attached.
    pub fn attach_model(&mut self, model: Model) -> Result<&mut Model, EngineError> {
        if self.model.is_some() {
            return Err(EngineError::ModelAlreadyAttached);
        }
        Ok(self.model.insert(model))
    }

    /// The model, once attached.
    #[must_use]
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Mutable model, once attached.
    pub fn model_mut(&mut self) -> Option<&mut Model> {
        self.model.as_mut()
    }

    /// Whether a model is attached.
    #[must_use]
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    // -- Camera / lights --

    /// Scene camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable scene camera (the viewport controller updates its aspect).
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Scene lights, ambient first.
    #[must_use]
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scene_has_lights_and_no_model() {
        let scene = Scene::new(&Options::page());
        assert!(!scene.has_model());
        assert_eq!(scene.lights().len(), 2);
        assert!((scene.camera().aspect - 1280.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn model_attaches_exactly_once() {
        let mut scene = Scene::new(&Options::preview());
        let attached = scene.attach_model(Model::default()).unwrap();
        attached.transform_mut().position.y = 1.0;
        assert_eq!(scene.model().unwrap().transform().position.y, 1.0);

        assert!(matches!(
            scene.attach_model(Model::default()),
            Err(EngineError::ModelAlreadyAttached)
        ));
        assert_eq!(scene.model().unwrap().transform().position.y, 1.0);
    }
}
