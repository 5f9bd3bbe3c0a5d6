//! Where asset bytes come from.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use super::LoadError;

/// Fetches raw asset bytes by path. Paths are `/`-separated and relative to
/// the source's root.
pub trait AssetSource: Send + Sync {
    /// Read the whole asset.
    fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError>;
}

/// Assets on the local filesystem under a root directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    /// Source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for FileSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        let full = self.root.join(path);
        std::fs::read(&full).map_err(|e| LoadError::network(path, e))
    }
}

/// In-memory assets, for tests and embedded content.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: FxHashMap<String, Vec<u8>>,
}

impl MemorySource {
    /// Empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: add an asset.
    #[must_use]
    pub fn with(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.insert(path, bytes);
        self
    }

    /// Add or replace an asset.
    pub fn insert(&mut self, path: &str, bytes: Vec<u8>) {
        let _ = self.files.insert(path.to_owned(), bytes);
    }
}

impl AssetSource for MemorySource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::network(path, "not found"))
    }
}

/// Largest response body accepted from an HTTP source.
#[cfg(feature = "http")]
const HTTP_BODY_LIMIT: u64 = 256 * 1024 * 1024;

/// Assets served over HTTP(S) below a base URL.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpSource {
    base: String,
}

#[cfg(feature = "http")]
impl HttpSource {
    /// Source rooted at `base` (e.g. `https://example.com/static`).
    #[must_use]
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_owned(),
        }
    }
}

#[cfg(feature = "http")]
impl AssetSource for HttpSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        let url = format!("{}/{}", self.base, path.trim_start_matches('/'));
        log::debug!("GET {url}");
        ureq::get(&url)
            .call()
            .map_err(|e| LoadError::network(path, e))?
            .into_body()
            .with_config()
            .limit(HTTP_BODY_LIMIT)
            .read_to_vec()
            .map_err(|e| LoadError::network(path, e))
    }
}

/// Resolve `uri` relative to the directory containing `base`.
pub(crate) fn resolve_relative(base: &str, uri: &str) -> String {
    let mut parts: Vec<&str> = match base.rfind('/') {
        Some(i) => base[..i].split('/').collect(),
        None => Vec::new(),
    };
    for segment in uri.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                let _ = parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.retain(|p| !p.is_empty());
    parts.join("/")
}
