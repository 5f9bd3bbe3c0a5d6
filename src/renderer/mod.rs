//! Scene rendering.
//!
//! The render loop draws through the [`SceneRenderer`] trait: the wgpu
//! [`GpuRenderer`] draws to a window surface, and the
//! [`RecordingRenderer`] captures frames for tests and headless runs.

use std::fmt;

use crate::scene::Scene;
use crate::viewport::SurfaceSize;

pub mod mesh_pass;
pub mod recording;

pub use mesh_pass::GpuRenderer;
pub use recording::{FrameRecord, RecordingRenderer};

/// A frame could not be drawn. No recovery is defined: the render loop stops
/// at the first failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderFailure {
    /// The drawing surface is gone (window closed, context lost).
    SurfaceLost,
    /// The GPU ran out of memory.
    OutOfMemory,
    /// The device failed or was lost.
    Device(String),
}

impl fmt::Display for RenderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfaceLost => write!(f, "render surface lost"),
            Self::OutOfMemory => write!(f, "out of GPU memory"),
            Self::Device(msg) => write!(f, "device failure: {msg}"),
        }
    }
}

impl std::error::Error for RenderFailure {}

/// Draws a scene through its camera onto a surface.
pub trait SceneRenderer {
    /// Match the surface to a new size. Called once at startup and on every
    /// resize, before the next frame.
    fn resize(&mut self, size: SurfaceSize);

    /// Draw one frame of `scene`.
    fn render(&mut self, scene: &Scene) -> Result<(), RenderFailure>;
}

impl<R: SceneRenderer + ?Sized> SceneRenderer for Box<R> {
    fn resize(&mut self, size: SurfaceSize) {
        (**self).resize(size);
    }

    fn render(&mut self, scene: &Scene) -> Result<(), RenderFailure> {
        (**self).render(scene)
    }
}
