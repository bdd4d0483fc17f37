//! Source-path discovery.
//!
//! The source path is the nearest directory at or above the start directory
//! that contains the manifest file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use scaffold_types::{ScaffoldError, DEFAULT_MANIFEST_FILENAME};

/// Finds the source path of a host.
#[async_trait]
pub trait PackageLocator: Send + Sync {
    async fn locate(&self, start: &Path) -> Result<PathBuf, ScaffoldError>;
}

/// Walks up from the start directory looking for a manifest file.
#[derive(Debug, Clone)]
pub struct ManifestLocator {
    manifest_file: String,
}

impl ManifestLocator {
    pub fn new(manifest_file: impl Into<String>) -> Self {
        Self {
            manifest_file: manifest_file.into(),
        }
    }

    pub fn manifest_file(&self) -> &str {
        &self.manifest_file
    }
}

impl Default for ManifestLocator {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST_FILENAME)
    }
}

#[async_trait]
impl PackageLocator for ManifestLocator {
    async fn locate(&self, start: &Path) -> Result<PathBuf, ScaffoldError> {
        let start = if start.is_absolute() {
            start.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| ScaffoldError::io("current directory", e))?
                .join(start)
        };

        // a file start (e.g. a module path) searches from its directory
        let mut current = match tokio::fs::metadata(&start).await {
            Ok(meta) if meta.is_file() => start.parent().map(Path::to_path_buf),
            _ => Some(start.clone()),
        };

        while let Some(dir) = current {
            let candidate = dir.join(&self.manifest_file);
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                debug!(source = %dir.display(), "located manifest");
                return Ok(dir);
            }
            current = dir.parent().map(Path::to_path_buf);
        }

        Err(ScaffoldError::Locator {
            start,
            manifest: self.manifest_file.clone(),
        })
    }
}
