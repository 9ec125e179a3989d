//! End-to-end resolution of the module's build dependencies.
//!
//! Everything the pipeline reads from the outside world is captured up
//! front in a [`ResolveContext`]: the project directory, the environment
//! snapshot and the merged configuration. Fetching and building go through
//! the [`Fetcher`] and [`BuildOrchestrator`] traits.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use url::Url;

use crate::builder::args::{assemble, AssemblyInputs, BuildConfig};
use crate::builder::cmake::BuildOrchestrator;
use crate::builder::locate::locate_sdk_cmake_dir;
use crate::core::artifact::{ArtifactTag, SdkVersion, DEFAULT_BASE_URL};
use crate::core::error::SdkError;
use crate::core::platform::{CpuArch, OsFamily, PlatformKey, RuntimeVersion};
use crate::sources::cache::{ArtifactCache, DEFAULT_CACHE_DIR};
use crate::sources::fetch::Fetcher;
use crate::util::config::Config;
use crate::util::env::BuildEnv;
use crate::util::fs::{absolutize, remove_dir_all_if_exists};
use crate::util::process::{find_python, probe_python_version};

/// Inputs to a resolution run.
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// Source tree of the module being built
    project_dir: PathBuf,

    env: BuildEnv,

    config: Config,

    /// OS name, `std::env::consts::OS` unless overridden
    os_name: String,

    /// Architecture name, `std::env::consts::ARCH` unless overridden
    arch_name: String,

    /// Explicit Python version, skipping every other source
    python_version: Option<RuntimeVersion>,

    offline: bool,
}

/// Dependencies resolved to local paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependencies {
    pub platform: PlatformKey,
    /// Artifact tag, absent when the SDK path was supplied
    pub tag: Option<ArtifactTag>,
    pub sdk_dir: PathBuf,
    pub sdk_cmake_dir: PathBuf,
    pub external_module_dir: PathBuf,
}

/// Everything needed to hand off to CMake.
#[derive(Debug, Clone)]
pub struct ResolvedBuild {
    pub dependencies: ResolvedDependencies,
    pub python_executable: PathBuf,
    pub config: BuildConfig,
}

impl ResolveContext {
    pub fn new(project_dir: PathBuf, env: BuildEnv, config: Config) -> Self {
        ResolveContext {
            project_dir,
            env,
            config,
            os_name: std::env::consts::OS.to_string(),
            arch_name: std::env::consts::ARCH.to_string(),
            python_version: None,
            offline: false,
        }
    }

    /// Resolve for another OS/architecture than the running one.
    pub fn with_host(mut self, os_name: impl Into<String>, arch_name: impl Into<String>) -> Self {
        self.os_name = os_name.into();
        self.arch_name = arch_name.into();
        self
    }

    pub fn with_python_version(mut self, version: Option<RuntimeVersion>) -> Self {
        self.python_version = version;
        self
    }

    /// Refuse to fetch; the config's `[net] offline` is honored as well.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn env(&self) -> &BuildEnv {
        &self.env
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// SDK version: environment, then config, then the built-in default.
    pub fn sdk_version(&self) -> Result<SdkVersion, SdkError> {
        match self
            .env
            .sdk_version
            .as_deref()
            .or(self.config.sdk.version.as_deref())
        {
            Some(version) => version.parse(),
            None => Ok(SdkVersion::default()),
        }
    }

    /// Cache root: environment, then config, then `<project>/_deps`.
    pub fn cache_root(&self) -> PathBuf {
        let dir = self
            .env
            .deps_dir
            .clone()
            .or_else(|| self.config.cache.dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));
        absolutize(&self.project_dir, &dir)
    }

    /// Base URL SDK archives are published under, always ending in `/`.
    pub fn base_url(&self) -> Result<Url> {
        let mut raw = self
            .config
            .sdk
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).with_context(|| format!("invalid SDK base URL `{}`", raw))
    }

    pub fn artifact_cache(&self) -> Result<ArtifactCache> {
        let install_path = self
            .env
            .sdk_install_path
            .as_deref()
            .map(|p| absolutize(&self.project_dir, p));

        Ok(ArtifactCache::new(self.cache_root(), self.base_url()?)
            .with_sdk_install_path(install_path)
            .offline(self.offline || self.config.net.offline))
    }

    pub fn python_executable(&self) -> Result<PathBuf, SdkError> {
        find_python(self.env.python_executable.as_deref())
    }

    /// Python version: explicit, then environment, then asking the interpreter.
    pub fn runtime_version(&self) -> Result<RuntimeVersion> {
        if let Some(version) = self.python_version {
            return Ok(version);
        }
        if let Some(raw) = &self.env.python_version {
            return Ok(raw.parse()?);
        }

        let python = self.python_executable()?;
        probe_python_version(&python)
    }

    /// Parse the OS and architecture names. Performs no I/O.
    pub fn host_names(&self) -> Result<(OsFamily, CpuArch), SdkError> {
        Ok((
            OsFamily::from_os_name(&self.os_name)?,
            CpuArch::from_arch_name(&self.arch_name)?,
        ))
    }

    /// The platform key for this run.
    pub fn platform(&self) -> Result<PlatformKey> {
        let (os, arch) = self.host_names()?;
        let runtime = self.runtime_version()?;
        let platform = PlatformKey::new(os, arch, runtime, self.env.force_arm64());

        if !platform.has_native_sdk() {
            tracing::warn!(
                "No {} SDK is published for {}; using {}",
                platform.os,
                platform.arch,
                platform.platform_suffix()
            );
        }
        tracing::debug!("Resolved platform {}", platform);
        Ok(platform)
    }

    /// Artifact tag for `platform` at the configured SDK version.
    pub fn artifact_tag(&self, platform: &PlatformKey) -> Result<ArtifactTag, SdkError> {
        Ok(ArtifactTag::new(&self.sdk_version()?, platform))
    }

    /// Local SDK root, fetching it if needed.
    ///
    /// A supplied `VTK_WHEEL_SDK_PATH` is returned as-is, without touching
    /// the cache.
    pub fn resolve_sdk_dir(
        &self,
        platform: &PlatformKey,
        fetcher: &dyn Fetcher,
    ) -> Result<(PathBuf, Option<ArtifactTag>)> {
        if let Some(path) = &self.env.sdk_path {
            tracing::info!("Using supplied SDK at {}", path.display());
            return Ok((path.clone(), None));
        }

        let tag = self.artifact_tag(platform)?;
        let path = self.artifact_cache()?.resolve(&tag, fetcher)?;
        Ok((path, Some(tag)))
    }

    /// Local VTKExternalModule checkout, fetching it if needed.
    pub fn resolve_external_module_dir(&self, fetcher: &dyn Fetcher) -> Result<PathBuf> {
        if let Some(path) = &self.env.external_module_path {
            tracing::info!("Using supplied VTKExternalModule at {}", path.display());
            return Ok(path.clone());
        }

        self.artifact_cache()?.resolve_external_module(fetcher)
    }

    /// Resolve the SDK and the external module.
    pub fn resolve_dependencies(&self, fetcher: &dyn Fetcher) -> Result<ResolvedDependencies> {
        // Fail on an unsupported host before running or fetching anything.
        self.host_names()?;

        let platform = self.platform()?;
        let (sdk_dir, tag) = self.resolve_sdk_dir(&platform, fetcher)?;
        let sdk_cmake_dir = locate_sdk_cmake_dir(&sdk_dir)?;
        let external_module_dir = self.resolve_external_module_dir(fetcher)?;

        Ok(ResolvedDependencies {
            platform,
            tag,
            sdk_dir,
            sdk_cmake_dir,
            external_module_dir,
        })
    }

    /// Resolve everything and assemble the CMake configuration.
    pub fn resolve_build(&self, fetcher: &dyn Fetcher) -> Result<ResolvedBuild> {
        let dependencies = self.resolve_dependencies(fetcher)?;
        let python_executable = self.python_executable()?;

        let config = assemble(&AssemblyInputs {
            platform: &dependencies.platform,
            module: &self.config.module,
            module_source_dir: &self.project_dir,
            sdk_cmake_dir: &dependencies.sdk_cmake_dir,
            external_module_dir: &dependencies.external_module_dir,
            python_executable: &python_executable,
            compatible_abi: self.env.compatible_abi,
            force_arm64: self.env.force_arm64(),
            extra_args: &self.config.build.extra_args,
        })?;

        Ok(ResolvedBuild {
            dependencies,
            python_executable,
            config,
        })
    }
}

/// Hand a resolved build to the orchestrator.
pub fn build(resolved: &ResolvedBuild, orchestrator: &dyn BuildOrchestrator) -> Result<()> {
    tracing::info!(
        "Building {} against {}",
        resolved.config.source_dir.display(),
        resolved.dependencies.sdk_cmake_dir.display()
    );
    orchestrator.invoke(&resolved.config)
}

/// Remove the dependency cache. Returns the removed directory.
pub fn clean(ctx: &ResolveContext) -> Result<PathBuf> {
    let root = ctx.cache_root();
    remove_dir_all_if_exists(&root)?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::args::CMakeDefine;
    use crate::test_support::{FetchCall, RecordingFetcher, RecordingOrchestrator, SdkTreeFixture};
    use tempfile::TempDir;

    const PYTHON: &str = "/usr/bin/python3";

    fn env_from(pairs: &[(&str, &str)]) -> BuildEnv {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BuildEnv::from_lookup(move |key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
    }

    fn context(project: &Path, os: &str, arch: &str, env: &[(&str, &str)]) -> ResolveContext {
        let mut pairs = vec![("Python3_EXECUTABLE", PYTHON)];
        pairs.extend_from_slice(env);
        ResolveContext::new(project.to_path_buf(), env_from(&pairs), Config::default())
            .with_host(os, arch)
            .with_python_version(Some(RuntimeVersion::new(3, 10)))
    }

    #[test]
    fn test_linux_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(tmp.path(), "linux", "x86_64", &[]);
        let fetcher = RecordingFetcher::new().populating_sdk();

        let resolved = ctx.resolve_build(&fetcher).unwrap();

        let tag = "vtk-wheel-sdk-9.2.5-cp310-cp310-manylinux_2_17_x86_64.manylinux2014_x86_64";
        let deps = tmp.path().join("_deps");
        assert_eq!(resolved.dependencies.sdk_dir, deps.join(tag));
        assert_eq!(
            resolved.dependencies.sdk_cmake_dir,
            deps.join(tag).join("vtk/headers/cmake")
        );
        assert_eq!(
            resolved.dependencies.external_module_dir,
            deps.join("VTKExternalModule")
        );

        let calls = fetcher.calls();
        assert_eq!(calls.len(), 2);
        match &calls[0] {
            FetchCall::Archive { url, .. } => assert_eq!(
                url.as_str(),
                format!("https://vtk.org/files/wheel-sdks/{}.tar.xz", tag)
            ),
            other => panic!("unexpected call {:?}", other),
        }

        let config = &resolved.config;
        assert_eq!(config.source_dir, deps.join("VTKExternalModule"));
        assert_eq!(
            config.get("VTK_DIR").unwrap().value,
            deps.join(tag).join("vtk/headers/cmake").display().to_string()
        );
        assert_eq!(config.get("Python3_EXECUTABLE").unwrap().value, PYTHON);
        assert_eq!(
            config.get("VTK_MODULE_SOURCE_DIR").unwrap().value,
            tmp.path().display().to_string()
        );
        assert!(config.contains("VTK_USE_X"));
        assert!(!config.contains("CMAKE_CXX_FLAGS"));
    }

    #[test]
    fn test_second_resolution_fetches_nothing() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(tmp.path(), "linux", "x86_64", &[]);

        let first = RecordingFetcher::new().populating_sdk();
        let resolved_first = ctx.resolve_dependencies(&first).unwrap();
        assert_eq!(first.calls().len(), 2);

        let second = RecordingFetcher::new().populating_sdk();
        let resolved_second = ctx.resolve_dependencies(&second).unwrap();
        assert!(second.calls().is_empty());
        assert_eq!(resolved_first, resolved_second);
    }

    #[test]
    fn test_supplied_paths_short_circuit() {
        let tmp = TempDir::new().unwrap();
        let sdk = tmp.path().join("my-sdk");
        SdkTreeFixture::new(&sdk).with_cmake_dir("vtk").create();
        let ext = tmp.path().join("my-ext");
        std::fs::create_dir_all(&ext).unwrap();

        let project = tmp.path().join("project");
        let ctx = context(
            &project,
            "linux",
            "x86_64",
            &[
                ("VTK_WHEEL_SDK_PATH", sdk.to_str().unwrap()),
                ("VTK_EXTERNAL_MODULE_PATH", ext.to_str().unwrap()),
            ],
        );
        let fetcher = RecordingFetcher::new();

        let resolved = ctx.resolve_build(&fetcher).unwrap();

        assert!(fetcher.calls().is_empty());
        assert!(!project.join("_deps").exists());
        assert_eq!(resolved.dependencies.tag, None);
        assert_eq!(resolved.dependencies.sdk_dir, sdk);
        assert_eq!(resolved.dependencies.sdk_cmake_dir, sdk.join("vtk/headers/cmake"));
        assert_eq!(resolved.config.source_dir, ext);
    }

    #[test]
    fn test_unsupported_os_does_nothing() {
        let tmp = TempDir::new().unwrap();
        // No python override either: the host check must come first.
        let ctx = ResolveContext::new(tmp.path().to_path_buf(), BuildEnv::default(), Config::default())
            .with_host("freebsd", "x86_64");
        let fetcher = RecordingFetcher::new();

        let err = ctx.resolve_build(&fetcher).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SdkError>(),
            Some(SdkError::UnsupportedPlatform { value, .. }) if value == "freebsd"
        ));
        assert!(fetcher.calls().is_empty());
        assert!(!tmp.path().join("_deps").exists());
    }

    #[test]
    fn test_compatible_abi_toggle() {
        let tmp = TempDir::new().unwrap();

        let on = context(
            tmp.path(),
            "linux",
            "x86_64",
            &[("LINUX_VTK_CLEAVER_USE_COMPATIBLE_ABI", "1")],
        )
        .resolve_build(&RecordingFetcher::new().populating_sdk())
        .unwrap();
        let off = context(
            tmp.path(),
            "linux",
            "x86_64",
            &[("LINUX_VTK_CLEAVER_USE_COMPATIBLE_ABI", "0")],
        )
        .resolve_build(&RecordingFetcher::new().populating_sdk())
        .unwrap();

        assert_eq!(
            on.config.options().last().unwrap(),
            &CMakeDefine::untyped("CMAKE_CXX_FLAGS", "-D_GLIBCXX_USE_CXX11_ABI=0")
        );
        assert!(!off.config.contains("CMAKE_CXX_FLAGS"));
        assert_eq!(on.config.options().len(), off.config.options().len() + 1);
    }

    #[test]
    fn test_macos_archflags_selects_arm64() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(tmp.path(), "darwin", "x86_64", &[("ARCHFLAGS", "-arch arm64")]);
        let fetcher = RecordingFetcher::new().populating_sdk();

        let resolved = ctx.resolve_build(&fetcher).unwrap();

        assert_eq!(resolved.dependencies.platform.arch, CpuArch::Arm64);
        assert_eq!(
            resolved.dependencies.tag.unwrap().as_str(),
            "vtk-wheel-sdk-9.2.5-cp310-cp310-macosx_11_0_arm64"
        );
        assert!(resolved.config.contains("VTK_USE_COCOA"));
        assert_eq!(
            resolved.config.get("CMAKE_SYSTEM_NAME").unwrap().value,
            "Darwin"
        );
    }

    #[test]
    fn test_env_and_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.sdk.version = Some("9.3.0".to_string());
        config.cache.dir = Some(PathBuf::from("cache"));

        let ctx = ResolveContext::new(tmp.path().to_path_buf(), env_from(&[]), config.clone());
        assert_eq!(ctx.sdk_version().unwrap().as_str(), "9.3.0");
        assert_eq!(ctx.cache_root(), tmp.path().join("cache"));

        let ctx = ResolveContext::new(
            tmp.path().to_path_buf(),
            env_from(&[
                ("VTK_WHEEL_SDK_VERSION", "9.2.6"),
                ("WHEEL_SDK_DEPS_DIR", "/opt/deps"),
            ]),
            config,
        );
        assert_eq!(ctx.sdk_version().unwrap().as_str(), "9.2.6");
        assert_eq!(ctx.cache_root(), PathBuf::from("/opt/deps"));
    }

    #[test]
    fn test_invalid_sdk_version_rejected() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(tmp.path(), "linux", "x86_64", &[("VTK_WHEEL_SDK_VERSION", "../9")]);
        let fetcher = RecordingFetcher::new();

        let err = ctx.resolve_build(&fetcher).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SdkError>(),
            Some(SdkError::InvalidSdkVersion { .. })
        ));
        assert!(fetcher.calls().is_empty());
    }

    #[test]
    fn test_runtime_version_from_env() {
        let tmp = TempDir::new().unwrap();
        let ctx = ResolveContext::new(
            tmp.path().to_path_buf(),
            env_from(&[("WHEEL_SDK_PYTHON_VERSION", "3.7")]),
            Config::default(),
        );
        assert_eq!(ctx.runtime_version().unwrap(), RuntimeVersion::new(3, 7));

        let ctx = ctx.with_python_version(Some(RuntimeVersion::new(3, 12)));
        assert_eq!(ctx.runtime_version().unwrap(), RuntimeVersion::new(3, 12));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.sdk.base_url = Some("https://mirror.example.com/sdks".to_string());
        let ctx = ResolveContext::new(tmp.path().to_path_buf(), BuildEnv::default(), config);

        assert_eq!(
            ctx.base_url().unwrap().as_str(),
            "https://mirror.example.com/sdks/"
        );
    }

    #[test]
    fn test_sdk_install_path_replaces_cache_location() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("sdk-here");
        let ctx = context(
            tmp.path(),
            "linux",
            "x86_64",
            &[("VTK_WHEEL_SDK_INSTALL_PATH", target.to_str().unwrap())],
        );
        let fetcher = RecordingFetcher::new().populating_sdk();

        let deps = ctx.resolve_dependencies(&fetcher).unwrap();
        assert_eq!(deps.sdk_dir, target);
        assert_eq!(deps.sdk_cmake_dir, target.join("vtk/headers/cmake"));
    }

    #[test]
    fn test_offline_without_cache_fails() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(tmp.path(), "linux", "x86_64", &[]).offline(true);
        let fetcher = RecordingFetcher::new();

        let err = ctx.resolve_dependencies(&fetcher).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SdkError>(),
            Some(SdkError::FetchDisabled { .. })
        ));
        assert!(fetcher.calls().is_empty());
    }

    #[test]
    fn test_fetch_failure_aborts() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(tmp.path(), "linux", "x86_64", &[]);
        let fetcher = RecordingFetcher::failing("connection refused");

        let err = ctx.resolve_build(&fetcher).unwrap_err();
        assert!(format!("{:#}", err).contains("connection refused"));
        // The external module is never attempted after the SDK fails.
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[test]
    fn test_build_hands_config_to_orchestrator() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(tmp.path(), "windows", "x86_64", &[]);
        let resolved = ctx
            .resolve_build(&RecordingFetcher::new().populating_sdk())
            .unwrap();
        let orchestrator = RecordingOrchestrator::new();

        build(&resolved, &orchestrator).unwrap();

        let invocations = orchestrator.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].to_args(), resolved.config.to_args());
        assert!(!invocations[0].contains("VTK_USE_X"));
        assert!(!invocations[0].contains("VTK_USE_COCOA"));
    }

    #[test]
    fn test_clean_removes_cache_root() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(tmp.path(), "linux", "x86_64", &[]);
        ctx.resolve_dependencies(&RecordingFetcher::new().populating_sdk())
            .unwrap();
        assert!(tmp.path().join("_deps").exists());

        let removed = clean(&ctx).unwrap();
        assert_eq!(removed, tmp.path().join("_deps"));
        assert!(!removed.exists());
    }
}
