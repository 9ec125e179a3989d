//! Assembly of the CMake cache options handed to the superbuild.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::core::error::SdkError;
use crate::core::platform::{OsFamily, PlatformKey};
use crate::util::config::ModuleConfig;

/// Compiler flag selecting the pre-C++11 libstdc++ ABI the published
/// linux SDK was built with.
pub const LEGACY_CXX_ABI_FLAG: &str = "-D_GLIBCXX_USE_CXX11_ABI=0";

/// Type annotation of a CMake cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheType {
    Bool,
    String,
    Path,
    Filepath,
}

impl CacheType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheType::Bool => "BOOL",
            CacheType::String => "STRING",
            CacheType::Path => "PATH",
            CacheType::Filepath => "FILEPATH",
        }
    }
}

impl FromStr for CacheType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BOOL" => Ok(CacheType::Bool),
            "STRING" => Ok(CacheType::String),
            "PATH" => Ok(CacheType::Path),
            "FILEPATH" => Ok(CacheType::Filepath),
            _ => Err(()),
        }
    }
}

/// One `-DNAME[:TYPE]=VALUE` cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CMakeDefine {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<CacheType>,
    pub value: String,
}

impl CMakeDefine {
    pub fn new(name: impl Into<String>, kind: Option<CacheType>, value: impl Into<String>) -> Self {
        CMakeDefine {
            name: name.into(),
            kind,
            value: value.into(),
        }
    }

    pub fn bool(name: impl Into<String>, value: bool) -> Self {
        Self::new(name, Some(CacheType::Bool), if value { "ON" } else { "OFF" })
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, Some(CacheType::String), value)
    }

    pub fn path(name: impl Into<String>, value: &Path) -> Self {
        Self::new(name, Some(CacheType::Path), value.display().to_string())
    }

    pub fn filepath(name: impl Into<String>, value: &Path) -> Self {
        Self::new(name, Some(CacheType::Filepath), value.display().to_string())
    }

    pub fn untyped(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, None, value)
    }

    /// Command-line form, e.g. `-DVTK_DIR:PATH=/sdk/headers/cmake`.
    pub fn to_arg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CMakeDefine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "-D{}:{}={}", self.name, kind.as_str(), self.value),
            None => write!(f, "-D{}={}", self.name, self.value),
        }
    }
}

impl FromStr for CMakeDefine {
    type Err = SdkError;

    /// Parses `NAME=VALUE` or `NAME:TYPE=VALUE`, with or without a leading `-D`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SdkError::InvalidOption {
            value: s.to_string(),
        };

        let body = s.strip_prefix("-D").unwrap_or(s);
        let (key, value) = body.split_once('=').ok_or_else(invalid)?;
        let (name, kind) = match key.split_once(':') {
            Some((name, ty)) => (name, Some(ty.parse::<CacheType>().map_err(|()| invalid())?)),
            None => (key, None),
        };

        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        Ok(CMakeDefine::new(name, kind, value))
    }
}

/// The configuration handed to the build orchestrator.
///
/// Once assembled it is only read. Entries keep insertion order, and a
/// later entry may not give an earlier name a different value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    /// Project the orchestrator configures (the VTKExternalModule checkout)
    pub source_dir: PathBuf,
    options: Vec<CMakeDefine>,
}

impl BuildConfig {
    pub fn new(source_dir: PathBuf) -> Self {
        BuildConfig {
            source_dir,
            options: Vec::new(),
        }
    }

    /// Append an option; repeating an identical entry is a no-op.
    pub fn push(&mut self, define: CMakeDefine) -> Result<(), SdkError> {
        if let Some(existing) = self.get(&define.name) {
            if existing.value == define.value {
                return Ok(());
            }
            return Err(SdkError::ConflictingOption {
                name: define.name,
                existing: existing.value.clone(),
                requested: define.value,
            });
        }
        self.options.push(define);
        Ok(())
    }

    pub fn options(&self) -> &[CMakeDefine] {
        &self.options
    }

    pub fn get(&self, name: &str) -> Option<&CMakeDefine> {
        self.options.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Options in command-line form.
    pub fn to_args(&self) -> Vec<String> {
        self.options.iter().map(CMakeDefine::to_arg).collect()
    }
}

/// Everything the assembler needs, already resolved.
#[derive(Debug, Clone)]
pub struct AssemblyInputs<'a> {
    pub platform: &'a PlatformKey,
    pub module: &'a ModuleConfig,
    /// Source tree of the VTK module being wrapped
    pub module_source_dir: &'a Path,
    /// The SDK's CMake directory
    pub sdk_cmake_dir: &'a Path,
    /// The VTKExternalModule checkout
    pub external_module_dir: &'a Path,
    pub python_executable: &'a Path,
    /// Use the legacy libstdc++ ABI (linux only)
    pub compatible_abi: bool,
    /// arm64 cross-compilation requested (macOS only)
    pub force_arm64: bool,
    /// User-supplied `NAME[:TYPE]=VALUE` entries, appended last
    pub extra_args: &'a [String],
}

/// Build the ordered option list for the superbuild.
pub fn assemble(inputs: &AssemblyInputs<'_>) -> Result<BuildConfig, SdkError> {
    let mut config = BuildConfig::new(inputs.external_module_dir.to_path_buf());

    let universal = [
        CMakeDefine::string("VTK_MODULE_NAME", inputs.module.name()),
        CMakeDefine::path("VTK_MODULE_SOURCE_DIR", inputs.module_source_dir),
        CMakeDefine::path("VTK_MODULE_CMAKE_MODULE_PATH", inputs.sdk_cmake_dir),
        CMakeDefine::bool("VTK_MODULE_SUPERBUILD", true),
        CMakeDefine::string(
            "VTK_MODULE_EXTERNAL_PROJECT_DEPENDENCIES",
            inputs.module.external_project_dependencies().join(";"),
        ),
        CMakeDefine::string(
            "VTK_MODULE_EXTERNAL_PROJECT_CMAKE_CACHE_ARGS",
            inputs.module.cache_args().join(";"),
        ),
        CMakeDefine::path("VTK_DIR", inputs.sdk_cmake_dir),
        CMakeDefine::string("CMAKE_INSTALL_LIBDIR", "lib"),
        CMakeDefine::filepath("Python3_EXECUTABLE", inputs.python_executable),
        CMakeDefine::bool("VTK_WHEEL_BUILD", true),
    ];
    for define in universal {
        config.push(define)?;
    }

    for define in platform_defines(inputs) {
        config.push(define)?;
    }

    for raw in inputs.extra_args {
        config.push(raw.parse()?)?;
    }

    Ok(config)
}

/// Options that only apply on the target platform.
fn platform_defines(inputs: &AssemblyInputs<'_>) -> Vec<CMakeDefine> {
    let mut defines = Vec::new();

    match inputs.platform.os {
        OsFamily::Linux => {
            // Needed for the render window to be compiled.
            defines.push(CMakeDefine::bool("VTK_USE_X", true));

            if inputs.compatible_abi {
                defines.push(CMakeDefine::untyped("CMAKE_CXX_FLAGS", LEGACY_CXX_ABI_FLAG));
            }
        }
        OsFamily::MacOs => {
            defines.push(CMakeDefine::bool("VTK_USE_COCOA", true));

            if inputs.force_arm64 {
                tracing::warn!(
                    "Cross-compiling for arm64 macOS; this configuration is best-effort and may not build"
                );
                defines.push(CMakeDefine::untyped("CMAKE_SYSTEM_NAME", "Darwin"));
            }
        }
        OsFamily::Windows => {}
    }

    defines
}
