//! Snapshot of the environment variables that steer resolution.
//!
//! The environment is read exactly once, at the process boundary, into a
//! [`BuildEnv`]. Everything downstream takes the snapshot as a plain value.

use std::path::PathBuf;

/// SDK version override.
pub const SDK_VERSION: &str = "VTK_WHEEL_SDK_VERSION";
/// Pre-supplied SDK root; bypasses the cache entirely.
pub const SDK_PATH: &str = "VTK_WHEEL_SDK_PATH";
/// Exact location the SDK is (or will be) unpacked to.
pub const SDK_INSTALL_PATH: &str = "VTK_WHEEL_SDK_INSTALL_PATH";
/// Pre-supplied VTKExternalModule checkout; bypasses the cache entirely.
pub const EXTERNAL_MODULE_PATH: &str = "VTK_EXTERNAL_MODULE_PATH";
/// Python interpreter override.
pub const PYTHON_EXECUTABLE: &str = "Python3_EXECUTABLE";
/// Python version override; skips probing the interpreter.
pub const PYTHON_VERSION: &str = "WHEEL_SDK_PYTHON_VERSION";
/// Cache root override.
pub const DEPS_DIR: &str = "WHEEL_SDK_DEPS_DIR";
/// Compiler architecture flags, as set by cibuildwheel on macOS.
pub const ARCHFLAGS: &str = "ARCHFLAGS";
/// `1` requests the pre-C++11 libstdc++ ABI on linux.
pub const COMPATIBLE_ABI: &str = "LINUX_VTK_CLEAVER_USE_COMPATIBLE_ABI";

/// `ARCHFLAGS` value that requests an arm64 macOS build.
const ARM64_ARCHFLAGS: &str = "-arch arm64";

/// Environment overrides, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnv {
    pub sdk_version: Option<String>,
    pub sdk_path: Option<PathBuf>,
    pub sdk_install_path: Option<PathBuf>,
    pub external_module_path: Option<PathBuf>,
    pub python_executable: Option<PathBuf>,
    pub python_version: Option<String>,
    pub deps_dir: Option<PathBuf>,
    pub archflags: Option<String>,
    pub compatible_abi: bool,
}

impl BuildEnv {
    /// Read the process environment.
    pub fn capture() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary lookup function.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let get_path = |key: &str| get(key).map(PathBuf::from);

        BuildEnv {
            sdk_version: get(SDK_VERSION),
            sdk_path: get_path(SDK_PATH),
            sdk_install_path: get_path(SDK_INSTALL_PATH),
            external_module_path: get_path(EXTERNAL_MODULE_PATH),
            python_executable: get_path(PYTHON_EXECUTABLE),
            python_version: get(PYTHON_VERSION),
            deps_dir: get_path(DEPS_DIR),
            archflags: get(ARCHFLAGS),
            compatible_abi: get(COMPATIBLE_ABI).as_deref() == Some("1"),
        }
    }

    /// Whether an arm64 macOS build was requested through `ARCHFLAGS`.
    pub fn force_arm64(&self) -> bool {
        self.archflags.as_deref() == Some(ARM64_ARCHFLAGS)
    }
}
