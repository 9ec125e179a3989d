//! Fetching dependencies over the network.
//!
//! Resolution logic only ever talks to the [`Fetcher`] trait, so tests can
//! substitute a recording fake. [`NetworkFetcher`] is the real thing: SDK
//! archives are downloaded with `reqwest` and unpacked by `cmake -E tar`,
//! the VTKExternalModule project is cloned with `git2`.
//!
//! Both fetches populate a `<install_dir>.partial` staging directory and
//! rename it into place only once complete, so an existing install
//! directory is always a finished one.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use git2::{Repository, ResetType};
use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

use crate::util::fs::{prepare_staging, promote_staging, remove_dir_all_if_exists};
use crate::util::hash::verify_sha256;
use crate::util::process::{find_cmake, ProcessBuilder};

/// Delegated fetch procedure.
///
/// Implementations must create `install_dir` on success and return an
/// error on any failure; there is no partial success.
pub trait Fetcher {
    /// Download the archive at `url` and unpack it into `install_dir`.
    fn fetch_archive(&self, product: &str, install_dir: &Path, url: &Url) -> Result<()>;

    /// Check out the VTKExternalModule project into `install_dir`.
    fn fetch_external_module(&self, install_dir: &Path) -> Result<()>;
}

/// A git repository at an optional revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSource {
    pub url: String,
    pub rev: Option<String>,
}

/// Fetcher that talks to the network.
pub struct NetworkFetcher {
    client: reqwest::blocking::Client,
    /// Explicit cmake binary; looked up on PATH when first needed otherwise
    cmake: Option<PathBuf>,
    external_module: GitSource,
    checksums: BTreeMap<String, String>,
}

impl NetworkFetcher {
    /// Create a fetcher that unpacks archives with `cmake`, or with the
    /// cmake found on PATH.
    pub fn new(cmake: Option<PathBuf>, external_module: GitSource) -> Result<Self> {
        // SDK archives are large; a slow link must not trip a deadline.
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("failed to create HTTP client")?;

        Ok(NetworkFetcher {
            client,
            cmake,
            external_module,
            checksums: BTreeMap::new(),
        })
    }

    /// Expected SHA256 digests keyed by archive file name.
    pub fn with_checksums(mut self, checksums: BTreeMap<String, String>) -> Self {
        self.checksums = checksums;
        self
    }

    /// Stream `url` into `dest`, with a progress bar on a terminal.
    fn download(&self, url: &Url, dest: &mut File) -> Result<()> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("failed to download {}", url))?;

        if !response.status().is_success() {
            bail!("failed to download {}: HTTP {}", url, response.status());
        }

        let pb = match response.content_length() {
            Some(len) => {
                let pb = ProgressBar::new(len);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")?
                        .progress_chars("#>-"),
                );
                pb
            }
            None => ProgressBar::new_spinner(),
        };
        pb.set_message("Downloading");

        let mut writer = pb.wrap_write(dest);
        response
            .copy_to(&mut writer)
            .with_context(|| format!("failed to read response body from {}", url))?;
        pb.finish_and_clear();

        Ok(())
    }

    fn download_and_unpack(&self, url: &Url, staging: &Path) -> Result<()> {
        let download_dir = staging.parent().unwrap_or(staging);
        let mut archive = tempfile::Builder::new()
            .prefix(".download-")
            .tempfile_in(download_dir)
            .with_context(|| {
                format!(
                    "failed to create download file in {}",
                    download_dir.display()
                )
            })?;

        self.download(url, archive.as_file_mut())?;

        let file_name = archive_file_name(url);
        if let Some(expected) = self.checksums.get(&file_name) {
            verify_sha256(archive.path(), expected)?;
            tracing::debug!("Checksum verified for {}", file_name);
        }

        let cmake = find_cmake(self.cmake.as_deref())?;
        ProcessBuilder::new(&cmake)
            .args(["-E", "tar", "xf"])
            .arg(archive.path())
            .cwd(staging)
            .exec_and_check()
            .with_context(|| format!("failed to unpack {}", file_name))?;

        Ok(())
    }
}

impl Fetcher for NetworkFetcher {
    fn fetch_archive(&self, product: &str, install_dir: &Path, url: &Url) -> Result<()> {
        tracing::info!("Fetching {} from {}", product, url);

        stage_and_promote(install_dir, |staging| self.download_and_unpack(url, staging))
            .with_context(|| format!("failed to fetch `{}` from {}", product, url))?;

        tracing::info!("Unpacked {} to {}", product, install_dir.display());
        Ok(())
    }

    fn fetch_external_module(&self, install_dir: &Path) -> Result<()> {
        let source = &self.external_module;
        tracing::info!("Cloning VTKExternalModule from {}", source.url);

        stage_and_promote(install_dir, |staging| clone_git_source(source, staging))
            .with_context(|| format!("failed to fetch VTKExternalModule from {}", source.url))
    }
}

/// Run `populate` against a fresh staging directory and move the result to
/// `install_dir`. The staging directory is discarded on failure.
fn stage_and_promote<F>(install_dir: &Path, populate: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let staging = prepare_staging(install_dir)?;

    let result = populate(&staging).and_then(|()| promote_staging(&staging, install_dir));
    if result.is_err() {
        if let Err(e) = remove_dir_all_if_exists(&staging) {
            tracing::warn!("{:#}", e);
        }
    }
    result
}

/// Clone a git source, resetting to its revision when one is pinned.
fn clone_git_source(source: &GitSource, dest: &Path) -> Result<()> {
    let repo = Repository::clone(&source.url, dest)
        .with_context(|| format!("failed to clone {}", source.url))?;

    if let Some(rev) = &source.rev {
        let object = repo
            .revparse_single(rev)
            .with_context(|| format!("revision `{}` not found in {}", rev, source.url))?;
        let commit = object.peel_to_commit()?;
        repo.reset(commit.as_object(), ResetType::Hard, None)?;
        tracing::debug!("Checked out {} at {}", source.url, commit.id());
    }

    Ok(())
}

/// Last path segment of `url`, used to key checksums.
fn archive_file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default()
        .to_string()
}
