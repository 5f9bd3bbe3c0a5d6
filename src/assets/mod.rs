//! Asset pipeline: fetch, decode and normalize the page model.
//!
//! A load runs on a background thread and completes exactly once through a
//! [`PendingModel`]. The owner polls it from its event loop and attaches the
//! model to the scene when it arrives; a failed load leaves the scene without
//! a model and is never retried here.

mod gltf;
mod normalize;
mod source;
mod texture;

use std::fmt;
use std::sync::mpsc;
use std::sync::Arc;

use log::{error, info};
pub use normalize::{normalize, ModelTextures};
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{AssetSource, FileSource, MemorySource};
pub use texture::{ColorSpace, TextureData};

use crate::error::EngineError;
use crate::options::{Options, PlacementOptions};
use crate::scene::Model;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a model or texture could not be loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The asset could not be fetched (missing file, connection failure).
    Network {
        /// Asset path.
        path: String,
        /// Underlying cause.
        message: String,
    },
    /// The asset was fetched but its contents are malformed.
    Decode {
        /// Asset path.
        path: String,
        /// Underlying cause.
        message: String,
    },
    /// The asset needs a decoder extension that is not available.
    DecoderConfig {
        /// Asset path.
        path: String,
        /// Required extension name.
        extension: String,
    },
}

impl LoadError {
    pub(crate) fn network(path: &str, cause: impl fmt::Display) -> Self {
        Self::Network {
            path: path.to_owned(),
            message: cause.to_string(),
        }
    }

    pub(crate) fn decode(path: &str, cause: impl fmt::Display) -> Self {
        Self::Decode {
            path: path.to_owned(),
            message: cause.to_string(),
        }
    }

    /// Whether trying again could succeed. Only fetch failures qualify;
    /// malformed assets and missing decoders fail the same way every time.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { path, message } => {
                write!(f, "failed to fetch {path}: {message}")
            }
            Self::Decode { path, message } => {
                write!(f, "failed to decode {path}: {message}")
            }
            Self::DecoderConfig { path, extension } => write!(
                f,
                "{path} requires {extension}, but no decoder is configured for it"
            ),
        }
    }
}

impl std::error::Error for LoadError {}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// What to load and how to place it.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRequest {
    /// glTF model path.
    pub model: String,
    /// Color map path.
    pub color_texture: Option<String>,
    /// Normal map path.
    pub normal_texture: Option<String>,
    /// Color space declared for the color map.
    pub color_space: ColorSpace,
    /// Color space declared for the normal map.
    pub normal_color_space: ColorSpace,
    /// Flip color map rows on decode. The normal map is never flipped.
    pub flip_y: bool,
    /// Placement applied after centering.
    pub placement: PlacementOptions,
}

impl AssetRequest {
    /// Request for the asset configured in `options`.
    #[must_use]
    pub fn from_options(options: &Options) -> Self {
        Self {
            model: options.assets.model.clone(),
            color_texture: options.assets.color_texture.clone(),
            normal_texture: options.assets.normal_texture.clone(),
            color_space: options.assets.texture_color_space,
            normal_color_space: options.assets.normal_color_space,
            flip_y: options.assets.flip_y,
            placement: options.placement.clone(),
        }
    }

    /// Request for a bare model with no textures and no placement.
    #[must_use]
    pub fn model(path: &str) -> Self {
        Self {
            model: path.to_owned(),
            color_texture: None,
            normal_texture: None,
            color_space: ColorSpace::Srgb,
            normal_color_space: ColorSpace::Srgb,
            flip_y: false,
            placement: PlacementOptions::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Loads models from an [`AssetSource`].
#[derive(Clone)]
pub struct AssetPipeline {
    source: Arc<dyn AssetSource>,
}

impl fmt::Debug for AssetPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetPipeline").finish_non_exhaustive()
    }
}

impl AssetPipeline {
    /// Pipeline reading from `source`.
    pub fn new(source: impl AssetSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Pipeline for a configured asset root: an HTTP base URL when the
    /// `http` feature is enabled and `root` is a URL, a directory otherwise.
    #[must_use]
    pub fn for_root(root: &str) -> Self {
        #[cfg(feature = "http")]
        {
            if root.starts_with("http://") || root.starts_with("https://") {
                return Self::new(HttpSource::new(root));
            }
        }
        Self::new(FileSource::new(root))
    }

    /// Start loading on a background thread.
    pub fn load(&self, request: AssetRequest) -> Result<PendingModel, EngineError> {
        let (tx, rx) = mpsc::channel();
        let source = Arc::clone(&self.source);
        info!("Loading model {}", request.model);
        let thread = std::thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                let result = load_with(source.as_ref(), &request);
                // The receiver may already be gone if the host gave up.
                let _ = tx.send(result);
            })
            .map_err(EngineError::ThreadSpawn)?;
        Ok(PendingModel {
            rx,
            thread: Some(thread),
            finished: false,
        })
    }

    /// Load on the calling thread.
    pub fn load_blocking(&self, request: &AssetRequest) -> Result<Model, LoadError> {
        load_with(self.source.as_ref(), request)
    }
}

fn load_with(source: &dyn AssetSource, request: &AssetRequest) -> Result<Model, LoadError> {
    let bytes = source.fetch(&request.model)?;
    let meshes = gltf::decode(&bytes, &request.model, source)?;

    let load_texture = |path: Option<&str>, color_space, flip_y| {
        path.map(|path| {
            let bytes = source.fetch(path)?;
            TextureData::decode(path, &bytes, color_space, flip_y).map(Arc::new)
        })
        .transpose()
    };
    let textures = ModelTextures {
        color: load_texture(
            request.color_texture.as_deref(),
            request.color_space,
            request.flip_y,
        )?,
        normal: load_texture(
            request.normal_texture.as_deref(),
            request.normal_color_space,
            false,
        )?,
    };

    Ok(normalize(meshes, &textures, &request.placement))
}

/// A load in flight. Yields its result exactly once.
#[derive(Debug)]
pub struct PendingModel {
    rx: mpsc::Receiver<Result<Model, LoadError>>,
    thread: Option<std::thread::JoinHandle<()>>,
    finished: bool,
}

impl PendingModel {
    /// Take the result if the load has completed. Returns `None` while the
    /// load is running and after the result has been taken.
    pub fn try_take(&mut self) -> Option<Result<Model, LoadError>> {
        if self.finished {
            return None;
        }
        let result = match self.rx.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return None,
            Err(mpsc::TryRecvError::Disconnected) => Err(loader_exited()),
        };
        Some(self.finish(result))
    }

    /// Block until the load completes.
    pub fn wait(mut self) -> Result<Model, LoadError> {
        if self.finished {
            return Err(loader_exited());
        }
        let result = self.rx.recv().unwrap_or_else(|_| Err(loader_exited()));
        self.finish(result)
    }

    /// Whether the result has been taken.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn finish(&mut self, result: Result<Model, LoadError>) -> Result<Model, LoadError> {
        self.finished = true;
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        if let Err(e) = &result {
            error!("Model load failed: {e}");
        }
        result
    }
}

fn loader_exited() -> LoadError {
    LoadError::decode("<loader>", "loader thread exited without a result")
}
