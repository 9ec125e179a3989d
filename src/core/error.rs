//! Resolution error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error raised while resolving or configuring an SDK build.
///
/// Network, git and process failures are not listed here: they propagate
/// as opaque `anyhow` errors with context attached at the call site.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("unsupported {kind} `{value}`")]
    UnsupportedPlatform { kind: &'static str, value: String },

    #[error("invalid Python version `{value}`")]
    InvalidRuntimeVersion { value: String },

    #[error("invalid SDK version `{value}`")]
    InvalidSdkVersion { value: String },

    #[error("no `{pattern}` directory found in SDK root [{}]", root.display())]
    IntegrationPathNotFound { root: PathBuf, pattern: String },

    #[error(
        "found {count} `{pattern}` directories in SDK root [{}], expected exactly one",
        root.display()
    )]
    AmbiguousIntegrationPath {
        root: PathBuf,
        pattern: String,
        count: usize,
        matches: Vec<PathBuf>,
    },

    #[error("unable to find a Python executable")]
    RuntimeExecutableNotFound { searched: Vec<String> },

    #[error("option `{name}` is already set to `{existing}`, refusing to set it to `{requested}`")]
    ConflictingOption {
        name: String,
        existing: String,
        requested: String,
    },

    #[error("invalid CMake option `{value}`")]
    InvalidOption { value: String },

    #[error("`{product}` is not cached at {} and fetching is disabled", location.display())]
    FetchDisabled { product: String, location: PathBuf },
}

impl SdkError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            SdkError::UnsupportedPlatform { kind, value } => {
                Diagnostic::error(format!("unsupported {} `{}`", kind, value))
                    .with_context("VTK wheel SDKs are published for linux, macOS and windows")
                    .with_context("supported architectures are x86_64 and arm64")
            }

            SdkError::InvalidRuntimeVersion { value } => {
                Diagnostic::error(format!("`{}` is not a Python version", value))
                    .with_suggestion("Use the `MAJOR.MINOR` form, for example `3.10`")
            }

            SdkError::InvalidSdkVersion { value } => {
                Diagnostic::error(format!("`{}` is not a usable SDK version", value))
                    .with_context("the version becomes part of the cache directory name")
                    .with_suggestion("Check the VTK_WHEEL_SDK_VERSION environment variable")
            }

            SdkError::IntegrationPathNotFound { root, pattern } => {
                Diagnostic::error("unable to find the CMake directory in the SDK")
                    .with_location(root)
                    .with_context(format!("searched for `{}`", pattern))
                    .with_suggestion(suggestions::CORRUPT_SDK)
            }

            SdkError::AmbiguousIntegrationPath {
                root,
                pattern,
                count,
                matches,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "found {} candidate CMake directories in the SDK",
                    count
                ))
                .with_location(root)
                .with_context(format!("searched for `{}`", pattern));

                for path in matches {
                    diag = diag.with_context(format!("match: {}", path.display()));
                }

                diag.with_suggestion(suggestions::CORRUPT_SDK)
            }

            SdkError::RuntimeExecutableNotFound { searched } => {
                Diagnostic::error("unable to find a Python executable")
                    .with_context(format!("searched PATH for: {}", searched.join(", ")))
                    .with_suggestion(suggestions::SET_PYTHON)
            }

            SdkError::ConflictingOption {
                name,
                existing,
                requested,
            } => Diagnostic::error(format!("conflicting values for CMake option `{}`", name))
                .with_context(format!("already set to `{}`", existing))
                .with_context(format!("requested `{}`", requested))
                .with_suggestion("Remove the duplicate entry from `[build] extra_args`"),

            SdkError::InvalidOption { value } => {
                Diagnostic::error(format!("`{}` is not a CMake cache option", value))
                    .with_suggestion("Use the `NAME=VALUE` or `NAME:TYPE=VALUE` form")
            }

            SdkError::FetchDisabled { product, location } => {
                Diagnostic::error(format!("`{}` is not available offline", product))
                    .with_location(location)
                    .with_suggestion(suggestions::GO_ONLINE)
            }
        }
    }
}
