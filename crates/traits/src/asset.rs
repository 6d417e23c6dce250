//! AssetProvider trait for looking up static report assets (the municipal logo).
//!
//! The report core never touches the filesystem itself; it asks a provider
//! for candidate paths in order and uses the first one that loads.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Error type for asset lookups.
#[derive(Error, Debug, Clone)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Failed to load asset '{path}': {message}")]
    LoadFailed { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        AssetError::Io(err.to_string())
    }
}

/// Shared asset bytes.
pub type SharedAssetData = Arc<Vec<u8>>;

/// A source of static assets.
///
/// # Implementations
///
/// - `FilesystemAssetProvider` (in `acs-report-resource`): reads below a base directory
/// - `InMemoryAssetProvider`: pre-populated map, used by tests and embedders
pub trait AssetProvider: Send + Sync + Debug {
    /// Load an asset by its relative path.
    fn load(&self, path: &str) -> Result<SharedAssetData, AssetError>;

    /// `true` if the asset exists and can be loaded.
    fn exists(&self, path: &str) -> bool;

    /// Returns a human-readable name for this provider (for logging).
    fn name(&self) -> &'static str;

    /// Loads the first candidate that exists, returning its path with the data.
    fn load_first(&self, candidates: &[String]) -> Option<(String, SharedAssetData)> {
        candidates.iter().find_map(|path| match self.load(path) {
            Ok(data) => Some((path.clone(), data)),
            Err(_) => None,
        })
    }
}

/// An in-memory asset provider.
#[derive(Debug, Default)]
pub struct InMemoryAssetProvider {
    assets: RwLock<HashMap<String, SharedAssetData>>,
}

impl InMemoryAssetProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset under `path`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns `AssetError::LoadFailed` if the internal lock is poisoned.
    pub fn add(&self, path: impl Into<String>, data: Vec<u8>) -> Result<(), AssetError> {
        let path = path.into();
        let mut assets = self.assets.write().map_err(|_| AssetError::LoadFailed {
            path: path.clone(),
            message: "asset store lock poisoned".to_string(),
        })?;
        assets.insert(path, Arc::new(data));
        Ok(())
    }

    /// Returns `None` if the lock is poisoned or the asset doesn't exist.
    pub fn remove(&self, path: &str) -> Option<SharedAssetData> {
        self.assets.write().ok()?.remove(path)
    }

    pub fn len(&self) -> usize {
        self.assets.read().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssetProvider for InMemoryAssetProvider {
    fn load(&self, path: &str) -> Result<SharedAssetData, AssetError> {
        let assets = self.assets.read().map_err(|_| AssetError::LoadFailed {
            path: path.to_string(),
            message: "asset store lock poisoned".to_string(),
        })?;
        assets
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> bool {
        self.assets
            .read()
            .map(|a| a.contains_key(path))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "InMemoryAssetProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_load() {
        let provider = InMemoryAssetProvider::new();
        provider.add("logo.png", b"png-bytes".to_vec()).unwrap();

        let data = provider.load("logo.png").unwrap();
        assert_eq!(&*data, b"png-bytes");
        assert!(provider.exists("logo.png"));
    }

    #[test]
    fn test_not_found() {
        let provider = InMemoryAssetProvider::new();
        assert!(matches!(provider.load("missing.png"), Err(AssetError::NotFound(_))));
        assert!(!provider.exists("missing.png"));
    }

    #[test]
    fn test_overwrite_and_remove() {
        let provider = InMemoryAssetProvider::new();
        provider.add("a", b"one".to_vec()).unwrap();
        provider.add("a", b"two".to_vec()).unwrap();
        assert_eq!(provider.len(), 1);
        assert_eq!(&*provider.load("a").unwrap(), b"two");

        assert!(provider.remove("a").is_some());
        assert!(provider.is_empty());
        assert!(provider.remove("a").is_none());
    }

    #[test]
    fn test_load_first_skips_missing_candidates() {
        let provider = InMemoryAssetProvider::new();
        provider.add("assets/logo.png", b"x".to_vec()).unwrap();
        provider.add("images/logo.png", b"y".to_vec()).unwrap();

        let candidates = vec![
            "logo.png".to_string(),
            "assets/logo.png".to_string(),
            "images/logo.png".to_string(),
        ];
        let (path, data) = provider.load_first(&candidates).unwrap();
        assert_eq!(path, "assets/logo.png");
        assert_eq!(&*data, b"x");

        assert!(provider.load_first(&["nope".to_string()]).is_none());
    }

    #[test]
    fn test_error_display() {
        let err = AssetError::LoadFailed {
            path: "logo.png".to_string(),
            message: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("logo.png"));
        assert!(err.to_string().contains("permission denied"));

        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err: AssetError = io_err.into();
        assert!(matches!(err, AssetError::Io(_)));
    }
}
