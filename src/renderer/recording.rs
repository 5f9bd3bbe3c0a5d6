//! Renderer that records what it would have drawn.

use super::{RenderFailure, SceneRenderer};
use crate::scene::{Scene, Transform};
use crate::viewport::SurfaceSize;

/// Snapshot of one rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// Model root transform, if a model was attached.
    pub model: Option<Transform>,
    /// Camera aspect ratio.
    pub aspect: f32,
    /// Number of meshes drawn.
    pub mesh_count: usize,
}

/// Records frames instead of drawing them. Can be told to fail after a
/// number of successful frames to exercise failure handling.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    frames: Vec<FrameRecord>,
    sizes: Vec<SurfaceSize>,
    fail_after: Option<usize>,
}

impl RecordingRenderer {
    /// Renderer that never fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer whose frame after the first `frames` fails with a lost
    /// surface.
    #[must_use]
    pub fn failing_after(frames: usize) -> Self {
        Self {
            fail_after: Some(frames),
            ..Self::default()
        }
    }

    /// Frames recorded so far.
    #[must_use]
    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    /// Sizes received through resize, in order.
    #[must_use]
    pub fn sizes(&self) -> &[SurfaceSize] {
        &self.sizes
    }
}

impl SceneRenderer for RecordingRenderer {
    fn resize(&mut self, size: SurfaceSize) {
        self.sizes.push(size);
    }

    fn render(&mut self, scene: &Scene) -> Result<(), RenderFailure> {
        if self.fail_after.is_some_and(|n| self.frames.len() >= n) {
            return Err(RenderFailure::SurfaceLost);
        }
        self.frames.push(FrameRecord {
            model: scene.model().map(|m| *m.transform()),
            aspect: scene.camera().aspect,
            mesh_count: scene.model().map_or(0, |m| m.meshes().len()),
        });
        Ok(())
    }
}
