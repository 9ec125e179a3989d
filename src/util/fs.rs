//! Filesystem utilities.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Sibling directory a fetch is unpacked into before it is moved into place.
///
/// `_deps/foo` stages in `_deps/foo.partial`.
pub fn staging_path(install_dir: &Path) -> PathBuf {
    let mut name = install_dir
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("fetch"));
    name.push(".partial");
    install_dir.with_file_name(name)
}

/// Prepare an empty staging directory for `install_dir`, discarding
/// leftovers of an interrupted run.
pub fn prepare_staging(install_dir: &Path) -> Result<PathBuf> {
    let staging = staging_path(install_dir);
    if staging.exists() {
        tracing::warn!(
            "Removing incomplete fetch left behind at {}",
            staging.display()
        );
        remove_dir_all_if_exists(&staging)?;
    }
    fs::create_dir_all(&staging)
        .with_context(|| format!("failed to create directory: {}", staging.display()))?;
    Ok(staging)
}

/// Move a fully populated staging directory to its final location.
pub fn promote_staging(staging: &Path, install_dir: &Path) -> Result<()> {
    if let Some(parent) = install_dir.parent() {
        ensure_dir(parent)?;
    }
    fs::rename(staging, install_dir).with_context(|| {
        format!(
            "failed to move {} to {}",
            staging.display(),
            install_dir.display()
        )
    })
}

/// Make `path` absolute relative to `base`, leaving absolute paths alone.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_staging_path() {
        assert_eq!(
            staging_path(Path::new("/cache/_deps/vtk-wheel-sdk-9.2.5")),
            PathBuf::from("/cache/_deps/vtk-wheel-sdk-9.2.5.partial")
        );
    }

    #[test]
    fn test_prepare_staging_clears_leftovers() {
        let tmp = TempDir::new().unwrap();
        let install = tmp.path().join("sdk");
        let stale = staging_path(&install);
        fs::create_dir_all(stale.join("half")).unwrap();

        let staging = prepare_staging(&install).unwrap();
        assert_eq!(staging, stale);
        assert!(staging.exists());
        assert!(!staging.join("half").exists());
    }

    #[test]
    fn test_promote_staging() {
        let tmp = TempDir::new().unwrap();
        let install = tmp.path().join("deps").join("sdk");
        let staging = tmp.path().join("sdk.partial");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("file.txt"), "content").unwrap();

        promote_staging(&staging, &install).unwrap();

        assert!(!staging.exists());
        assert_eq!(fs::read_to_string(install.join("file.txt")).unwrap(), "content");
    }

    #[test]
    fn test_absolutize() {
        let base = Path::new("/project");
        assert_eq!(absolutize(base, Path::new("_deps")), PathBuf::from("/project/_deps"));
        assert_eq!(absolutize(base, Path::new("/abs")), PathBuf::from("/abs"));
    }
}
