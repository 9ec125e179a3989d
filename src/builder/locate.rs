//! Discovery of the CMake integration directory inside an SDK.
//!
//! The traversal ([`find_candidates`]) and the exactly-one policy
//! ([`select_unique`]) are separate so the policy can be checked against
//! synthetic listings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob, Pattern};

use crate::core::error::SdkError;

/// Location of the CMake package files inside an unpacked wheel SDK.
pub const SDK_CMAKE_PATTERN: &str = "**/headers/cmake";

/// Pick the single candidate, or fail with the cardinality error.
pub fn select_unique(
    root: &Path,
    pattern: &str,
    mut candidates: Vec<PathBuf>,
) -> Result<PathBuf, SdkError> {
    match candidates.len() {
        0 => Err(SdkError::IntegrationPathNotFound {
            root: root.to_path_buf(),
            pattern: pattern.to_string(),
        }),
        1 => Ok(candidates.remove(0)),
        count => Err(SdkError::AmbiguousIntegrationPath {
            root: root.to_path_buf(),
            pattern: pattern.to_string(),
            count,
            matches: candidates,
        }),
    }
}

/// All directories under `root` matching `pattern`, sorted.
pub fn find_candidates(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full_pattern = format!(
        "{}/{}",
        Pattern::escape(&root.to_string_lossy()),
        pattern
    );

    let mut results = Vec::new();
    for entry in
        glob(&full_pattern).with_context(|| format!("invalid glob pattern: {}", pattern))?
    {
        match entry {
            Ok(path) if path.is_dir() => results.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!("glob error: {}", e),
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Find the one directory under `root` matching `pattern`.
pub fn locate(root: &Path, pattern: &str) -> Result<PathBuf> {
    let candidates = find_candidates(root, pattern)?;
    tracing::debug!(
        "Found {} match(es) for `{}` under {}",
        candidates.len(),
        pattern,
        root.display()
    );
    Ok(select_unique(root, pattern, candidates)?)
}

/// Find the CMake directory of an unpacked SDK.
pub fn locate_sdk_cmake_dir(sdk_root: &Path) -> Result<PathBuf> {
    locate(sdk_root, SDK_CMAKE_PATTERN)
}
