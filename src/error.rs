//! Crate-level error types.

use std::fmt;

use crate::assets::LoadError;
use crate::gpu::render_context::RenderContextError;
use crate::renderer::RenderFailure;
use crate::scroll::ConfigurationError;

/// Errors produced by the scrollscape crate.
#[derive(Debug)]
pub enum EngineError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Model or texture could not be loaded.
    Load(LoadError),
    /// A frame could not be drawn; the render loop has stopped.
    Render(RenderFailure),
    /// Invalid scroll track or trigger configuration.
    Configuration(ConfigurationError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Failed to spawn a background thread.
    ThreadSpawn(std::io::Error),
    /// A model is already attached to the scene.
    ModelAlreadyAttached,
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Load(e) => write!(f, "asset load error: {e}"),
            Self::Render(e) => write!(f, "render failure: {e}"),
            Self::Configuration(e) => {
                write!(f, "scroll configuration error: {e}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
            Self::ModelAlreadyAttached => {
                write!(f, "a model is already attached to the scene")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Load(e) => Some(e),
            Self::Render(e) => Some(e),
            Self::Configuration(e) => Some(e),
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for EngineError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<LoadError> for EngineError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

impl From<RenderFailure> for EngineError {
    fn from(e: RenderFailure) -> Self {
        Self::Render(e)
    }
}

impl From<ConfigurationError> for EngineError {
    fn from(e: ConfigurationError) -> Self {
        Self::Configuration(e)
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
