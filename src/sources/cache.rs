//! Local dependency cache.
//!
//! Every resolved SDK lives in `<root>/<artifact tag>`; the companion
//! VTKExternalModule checkout lives in `<root>/VTKExternalModule`. A path
//! that exists is trusted as a finished fetch and returned without any
//! network or content check.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use url::Url;

use crate::core::artifact::{ArtifactTag, SDK_PREFIX};
use crate::core::error::SdkError;
use crate::sources::fetch::Fetcher;

/// Directory name of the companion project inside the cache root.
pub const EXTERNAL_MODULE_DIR: &str = "VTKExternalModule";

/// Cache root used when nothing overrides it, relative to the project.
pub const DEFAULT_CACHE_DIR: &str = "_deps";

/// Where an artifact lives locally, and whether it is already there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub tag: ArtifactTag,
    pub local_path: PathBuf,
    pub exists: bool,
}

/// Manages the dependency cache directory.
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    /// Cache directory for unpacked dependencies
    root: PathBuf,

    /// Base URL SDK archives are published under
    base_url: Url,

    /// Exact SDK install location, replacing `root/<tag>`
    sdk_install_path: Option<PathBuf>,

    /// Fail instead of fetching
    offline: bool,
}

impl ArtifactCache {
    /// Create a new cache rooted at `root`.
    pub fn new(root: PathBuf, base_url: Url) -> Self {
        ArtifactCache {
            root,
            base_url,
            sdk_install_path: None,
            offline: false,
        }
    }

    /// Unpack the SDK to exactly this location instead of `root/<tag>`.
    pub fn with_sdk_install_path(mut self, path: Option<PathBuf>) -> Self {
        self.sdk_install_path = path;
        self
    }

    /// Refuse to fetch anything that is not already cached.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Get the cache directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Compute the cache entry for an SDK tag.
    pub fn entry(&self, tag: &ArtifactTag) -> CacheEntry {
        let local_path = self
            .sdk_install_path
            .clone()
            .unwrap_or_else(|| self.root.join(tag.as_str()));
        let exists = local_path.exists();

        CacheEntry {
            tag: tag.clone(),
            local_path,
            exists,
        }
    }

    /// Download URL of the archive for `tag`.
    pub fn archive_url(&self, tag: &ArtifactTag) -> Result<Url> {
        self.base_url
            .join(&tag.archive_name())
            .with_context(|| format!("failed to build download URL for {}", tag))
    }

    /// Return the local SDK path for `tag`, fetching it if absent.
    pub fn resolve(&self, tag: &ArtifactTag, fetcher: &dyn Fetcher) -> Result<PathBuf> {
        let entry = self.entry(tag);
        if entry.exists {
            tracing::info!("Using cached SDK at {}", entry.local_path.display());
            return Ok(entry.local_path);
        }

        self.ensure_online(SDK_PREFIX, &entry.local_path)?;

        let url = self.archive_url(tag)?;
        fetcher.fetch_archive(SDK_PREFIX, &entry.local_path, &url)?;
        Ok(entry.local_path)
    }

    /// Path of the companion VTKExternalModule checkout.
    pub fn external_module_path(&self) -> PathBuf {
        self.root.join(EXTERNAL_MODULE_DIR)
    }

    /// Return the local VTKExternalModule path, fetching it if absent.
    pub fn resolve_external_module(&self, fetcher: &dyn Fetcher) -> Result<PathBuf> {
        let path = self.external_module_path();
        if path.exists() {
            tracing::info!("Using cached VTKExternalModule at {}", path.display());
            return Ok(path);
        }

        self.ensure_online(EXTERNAL_MODULE_DIR, &path)?;

        fetcher.fetch_external_module(&path)?;
        Ok(path)
    }

    fn ensure_online(&self, product: &str, location: &Path) -> Result<(), SdkError> {
        if self.offline {
            return Err(SdkError::FetchDisabled {
                product: product.to_string(),
                location: location.to_path_buf(),
            });
        }
        Ok(())
    }
}
