//! Filesystem-backed asset provider.
//!
//! Paths are resolved below a base directory. Absolute paths and anything that
//! would escape the base directory are refused.

use acs_report_traits::{AssetError, AssetProvider, SharedAssetData};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

#[derive(Debug)]
pub struct FilesystemAssetProvider {
    base_path: PathBuf,
    canonical_base: Option<PathBuf>,
}

impl FilesystemAssetProvider {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        let base = base_path.as_ref().to_path_buf();
        let canonical = base.canonicalize().ok();
        Self {
            base_path: base,
            canonical_base: canonical,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base_path
    }

    /// Returns `None` if the path would leave the base directory.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        if relative.is_absolute() {
            return None;
        }
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return None;
        }

        let full_path = self.base_path.join(relative);
        if let Ok(canonical) = full_path.canonicalize()
            && let Some(base) = &self.canonical_base
        {
            // Symlinks can still point outside the base.
            return canonical.starts_with(base).then_some(canonical);
        }
        Some(full_path)
    }
}

impl AssetProvider for FilesystemAssetProvider {
    fn load(&self, path: &str) -> Result<SharedAssetData, AssetError> {
        let full_path = self
            .resolve(path)
            .ok_or_else(|| AssetError::NotFound(format!("{} (outside asset directory)", path)))?;

        std::fs::read(&full_path).map(Arc::new).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AssetError::NotFound(path.to_string())
            } else {
                AssetError::LoadFailed {
                    path: path.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "FilesystemAssetProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_existing_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("logo.png"), b"fake png").unwrap();

        let provider = FilesystemAssetProvider::new(dir.path());
        let data = provider.load("logo.png").unwrap();
        assert_eq!(&*data, b"fake png");
        assert!(provider.exists("logo.png"));
    }

    #[test]
    fn test_nested_candidate_lookup() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("images")).unwrap();
        fs::write(dir.path().join("images").join("logo.png"), b"nested").unwrap();

        let provider = FilesystemAssetProvider::new(dir.path());
        let candidates = vec!["logo.png".to_string(), "images/logo.png".to_string()];
        let (path, data) = provider.load_first(&candidates).unwrap();
        assert_eq!(path, "images/logo.png");
        assert_eq!(&*data, b"nested");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let provider = FilesystemAssetProvider::new(dir.path());
        assert!(matches!(provider.load("logo.jpg"), Err(AssetError::NotFound(_))));
        assert!(!provider.exists("logo.jpg"));
    }

    #[test]
    fn test_directories_do_not_count_as_assets() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("assets")).unwrap();
        let provider = FilesystemAssetProvider::new(dir.path());
        assert!(!provider.exists("assets"));
    }

    #[test]
    fn test_blocks_traversal_and_absolute_paths() {
        let dir = tempdir().unwrap();
        let provider = FilesystemAssetProvider::new(dir.path());

        assert!(provider.load("../../../etc/passwd").is_err());
        assert!(!provider.exists("../secret"));
        assert!(provider.load("/etc/passwd").is_err());
        assert!(!provider.exists("/etc/passwd"));
    }
}
