//! Shared download directory
//!
//! The driver factory writes it from the `download` key; browser capabilities
//! and test steps that inspect downloaded files read it.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::info;

/// Directory used when nothing is configured
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

/// Cloneable handle to the active download directory
#[derive(Debug, Clone)]
pub struct DownloadManager {
    directory: Arc<RwLock<PathBuf>>,
}

impl DownloadManager {
    pub fn new() -> Self {
        Self {
            directory: Arc::new(RwLock::new(PathBuf::from(DEFAULT_DOWNLOAD_DIR))),
        }
    }

    /// Replace the active download directory
    pub fn set_download_directory<P: AsRef<Path>>(&self, path: P) {
        let path = path.as_ref().to_path_buf();
        info!("Download directory set to {}", path.display());
        match self.directory.write() {
            Ok(mut dir) => *dir = path,
            Err(poisoned) => *poisoned.into_inner() = path,
        }
    }

    /// Active download directory
    pub fn download_directory(&self) -> PathBuf {
        match self.directory.read() {
            Ok(dir) => dir.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Absolute form of the active directory, for browser preferences
    pub fn absolute_download_directory(&self) -> PathBuf {
        let dir = self.download_directory();
        if dir.is_absolute() {
            dir
        } else {
            std::env::current_dir().map(|cwd| cwd.join(&dir)).unwrap_or(dir)
        }
    }
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new()
    }
}
