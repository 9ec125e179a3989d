//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.wheel-sdk/config.toml` - User-wide defaults
//! - Project: `<project>/.wheel-sdk/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Environment
//! variables (see [`crate::util::env`]) take precedence over both.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Module identity used when the config does not name one.
pub const DEFAULT_MODULE_NAME: &str = "Cleaver";

/// External projects built ahead of the module by the superbuild.
pub const DEFAULT_EXTERNAL_PROJECT_DEPENDENCIES: &[&str] = &["CLEAVER"];

/// Cache variables forwarded from the superbuild into the nested build.
pub const DEFAULT_CACHE_ARGS: &[&str] = &["VTK_USE_X", "VTK_USE_COCOA"];

/// Git repository of the VTKExternalModule helper project.
pub const DEFAULT_EXTERNAL_MODULE_URL: &str =
    "https://github.com/KitwareMedical/VTKExternalModule.git";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Module identity
    pub module: ModuleConfig,

    /// SDK selection and download
    pub sdk: SdkConfig,

    /// Companion VTKExternalModule checkout
    pub external_module: ExternalModuleConfig,

    /// Cache location
    pub cache: CacheConfig,

    /// CMake handoff settings
    pub build: BuildSettings,

    /// Network settings
    pub net: NetConfig,
}

/// Identity of the module being built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// VTK module name (e.g., "Cleaver")
    pub name: Option<String>,

    /// External projects the superbuild builds first
    pub external_project_dependencies: Option<Vec<String>>,

    /// Cache variables propagated to the nested build
    pub cache_args: Option<Vec<String>>,
}

impl ModuleConfig {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_MODULE_NAME)
    }

    pub fn external_project_dependencies(&self) -> Vec<String> {
        self.external_project_dependencies
            .clone()
            .unwrap_or_else(|| to_strings(DEFAULT_EXTERNAL_PROJECT_DEPENDENCIES))
    }

    pub fn cache_args(&self) -> Vec<String> {
        self.cache_args
            .clone()
            .unwrap_or_else(|| to_strings(DEFAULT_CACHE_ARGS))
    }
}

/// SDK selection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// SDK version (VTK_WHEEL_SDK_VERSION wins over this)
    pub version: Option<String>,

    /// Base URL archives are downloaded from
    pub base_url: Option<String>,

    /// Expected SHA256 per archive file name
    pub checksums: BTreeMap<String, String>,
}

/// Companion project source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalModuleConfig {
    /// Git URL to clone
    pub url: Option<String>,

    /// Commit, tag or branch to check out (default branch if unset)
    pub rev: Option<String>,
}

impl ExternalModuleConfig {
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_EXTERNAL_MODULE_URL)
    }
}

/// Cache settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root, relative paths are taken from the project directory
    pub dir: Option<PathBuf>,
}

/// Settings for the CMake handoff.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// CMake binary directory
    pub build_dir: Option<PathBuf>,

    /// CMAKE_BUILD_TYPE (default "Release")
    pub build_type: Option<String>,

    /// Run `cmake --install` into this prefix after building
    pub install_prefix: Option<PathBuf>,

    /// Additional `NAME[:TYPE]=VALUE` cache options
    pub extra_args: Vec<String>,

    /// Path to the cmake executable
    pub cmake: Option<PathBuf>,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Offline mode (fail instead of downloading)
    pub offline: bool,
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.module.name.is_some() {
            self.module.name = other.module.name;
        }
        if other.module.external_project_dependencies.is_some() {
            self.module.external_project_dependencies = other.module.external_project_dependencies;
        }
        if other.module.cache_args.is_some() {
            self.module.cache_args = other.module.cache_args;
        }

        if other.sdk.version.is_some() {
            self.sdk.version = other.sdk.version;
        }
        if other.sdk.base_url.is_some() {
            self.sdk.base_url = other.sdk.base_url;
        }
        self.sdk.checksums.extend(other.sdk.checksums);

        if other.external_module.url.is_some() {
            self.external_module.url = other.external_module.url;
        }
        if other.external_module.rev.is_some() {
            self.external_module.rev = other.external_module.rev;
        }

        if other.cache.dir.is_some() {
            self.cache.dir = other.cache.dir;
        }

        if other.build.build_dir.is_some() {
            self.build.build_dir = other.build.build_dir;
        }
        if other.build.build_type.is_some() {
            self.build.build_type = other.build.build_type;
        }
        if other.build.install_prefix.is_some() {
            self.build.install_prefix = other.build.install_prefix;
        }
        if !other.build.extra_args.is_empty() {
            self.build.extra_args = other.build.extra_args;
        }
        if other.build.cmake.is_some() {
            self.build.cmake = other.build.cmake;
        }

        if other.net.offline {
            self.net.offline = true;
        }
    }
}

/// Get the global config directory (~/.wheel-sdk).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".wheel-sdk"))
}

/// Get the global config path (~/.wheel-sdk/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (<project>/.wheel-sdk/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".wheel-sdk").join("config.toml")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}
