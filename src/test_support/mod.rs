//! Test utilities and fakes for unit tests.
//!
//! The resolution pipeline only talks to the outside world through the
//! [`Fetcher`] and [`BuildOrchestrator`] traits. The fakes here record
//! every call and simulate the filesystem effects a real fetch would have.
//!
//! # Example
//!
//! ```rust,ignore
//! use wheel_sdk::test_support::{RecordingFetcher, FetchCall};
//!
//! #[test]
//! fn test_example() {
//!     let fetcher = RecordingFetcher::new().populating_sdk();
//!     let path = cache.resolve(&tag, &fetcher).unwrap();
//!     assert_eq!(fetcher.calls().len(), 1);
//! }
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};
use url::Url;

use crate::builder::args::BuildConfig;
use crate::builder::cmake::BuildOrchestrator;
use crate::sources::fetch::Fetcher;

pub use fixtures::*;

/// A call received by [`RecordingFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCall {
    Archive {
        product: String,
        install_dir: PathBuf,
        url: Url,
    },
    ExternalModule {
        install_dir: PathBuf,
    },
}

/// Fetcher that records calls instead of touching the network.
///
/// On success it creates the install directory, as the real fetcher would,
/// so a second resolution finds it cached.
#[derive(Debug, Default)]
pub struct RecordingFetcher {
    calls: Mutex<Vec<FetchCall>>,
    populate_sdk: bool,
    failure: Option<String>,
}

impl RecordingFetcher {
    /// A fetcher that succeeds and creates empty install directories.
    pub fn new() -> Self {
        RecordingFetcher::default()
    }

    /// A fetcher that records the call and then fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        RecordingFetcher {
            failure: Some(message.into()),
            ..RecordingFetcher::default()
        }
    }

    /// Lay out fetched archives like a real SDK (`<dir>/headers/cmake`).
    pub fn populating_sdk(mut self) -> Self {
        self.populate_sdk = true;
        self
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: FetchCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if let Some(message) = &self.failure {
            bail!("{}", message);
        }
        Ok(())
    }
}

impl Fetcher for RecordingFetcher {
    fn fetch_archive(&self, product: &str, install_dir: &Path, url: &Url) -> Result<()> {
        self.record(FetchCall::Archive {
            product: product.to_string(),
            install_dir: install_dir.to_path_buf(),
            url: url.clone(),
        })?;

        if self.populate_sdk {
            SdkTreeFixture::new(install_dir).with_cmake_dir("vtk").create();
        } else {
            std::fs::create_dir_all(install_dir)?;
        }
        Ok(())
    }

    fn fetch_external_module(&self, install_dir: &Path) -> Result<()> {
        self.record(FetchCall::ExternalModule {
            install_dir: install_dir.to_path_buf(),
        })?;
        std::fs::create_dir_all(install_dir)?;
        Ok(())
    }
}

/// Orchestrator that keeps the configurations it was handed.
#[derive(Debug, Default)]
pub struct RecordingOrchestrator {
    invocations: Mutex<Vec<BuildConfig>>,
}

impl RecordingOrchestrator {
    pub fn new() -> Self {
        RecordingOrchestrator::default()
    }

    pub fn invocations(&self) -> Vec<BuildConfig> {
        self.invocations.lock().unwrap().clone()
    }
}

impl BuildOrchestrator for RecordingOrchestrator {
    fn invoke(&self, config: &BuildConfig) -> Result<()> {
        self.invocations.lock().unwrap().push(config.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_recording_fetcher_creates_dirs() {
        let tmp = TempDir::new().unwrap();
        let fetcher = RecordingFetcher::new().populating_sdk();
        let url = Url::parse("https://example.com/sdk.tar.xz").unwrap();

        fetcher
            .fetch_archive("vtk-wheel-sdk", &tmp.path().join("sdk"), &url)
            .unwrap();
        fetcher
            .fetch_external_module(&tmp.path().join("ext"))
            .unwrap();

        assert!(tmp.path().join("sdk/vtk/headers/cmake").is_dir());
        assert!(tmp.path().join("ext").is_dir());
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[test]
    fn test_failing_fetcher_creates_nothing() {
        let tmp = TempDir::new().unwrap();
        let fetcher = RecordingFetcher::failing("boom");

        let err = fetcher
            .fetch_external_module(&tmp.path().join("ext"))
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(!tmp.path().join("ext").exists());
    }
}
