//! CMake handoff.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::args::BuildConfig;
use crate::util::fs::ensure_dir;
use crate::util::process::ProcessBuilder;

/// Build type used when none is configured.
pub const DEFAULT_BUILD_TYPE: &str = "Release";

/// Downstream build system that consumes an assembled configuration.
pub trait BuildOrchestrator {
    /// Configure and build `config.source_dir` with `config`'s options.
    fn invoke(&self, config: &BuildConfig) -> Result<()>;
}

/// Runs CMake configure, build and (optionally) install steps.
#[derive(Debug, Clone)]
pub struct CMakeOrchestrator {
    cmake: PathBuf,
    build_dir: PathBuf,
    build_type: String,
    install_prefix: Option<PathBuf>,
}

impl CMakeOrchestrator {
    /// Create a new orchestrator writing its binary tree to `build_dir`.
    pub fn new(cmake: PathBuf, build_dir: PathBuf) -> Self {
        CMakeOrchestrator {
            cmake,
            build_dir,
            build_type: DEFAULT_BUILD_TYPE.to_string(),
            install_prefix: None,
        }
    }

    /// Set CMAKE_BUILD_TYPE (and the multi-config `--config`).
    pub fn build_type(mut self, build_type: impl Into<String>) -> Self {
        self.build_type = build_type.into();
        self
    }

    /// Install into `prefix` after building.
    pub fn install_prefix(mut self, prefix: Option<PathBuf>) -> Self {
        self.install_prefix = prefix;
        self
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// The configure command for `config`.
    pub fn configure_command(&self, config: &BuildConfig) -> ProcessBuilder {
        ProcessBuilder::new(&self.cmake)
            .arg("-S")
            .arg(&config.source_dir)
            .arg("-B")
            .arg(&self.build_dir)
            .arg(format!("-DCMAKE_BUILD_TYPE={}", self.build_type))
            .args(config.to_args())
    }

    /// The build command.
    pub fn build_command(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.cmake)
            .arg("--build")
            .arg(&self.build_dir)
            .args(["--config", self.build_type.as_str()])
            .arg("--parallel")
    }

    /// The install command, if an install prefix is set.
    pub fn install_command(&self) -> Option<ProcessBuilder> {
        self.install_prefix.as_ref().map(|prefix| {
            ProcessBuilder::new(&self.cmake)
                .arg("--install")
                .arg(&self.build_dir)
                .args(["--config", self.build_type.as_str()])
                .arg("--prefix")
                .arg(prefix)
        })
    }
}

impl BuildOrchestrator for CMakeOrchestrator {
    fn invoke(&self, config: &BuildConfig) -> Result<()> {
        ensure_dir(&self.build_dir)?;

        tracing::info!("Configuring {}", config.source_dir.display());
        self.configure_command(config)
            .run()
            .context("CMake configuration failed")?;

        tracing::info!("Building in {}", self.build_dir.display());
        self.build_command().run().context("CMake build failed")?;

        if let Some(install) = self.install_command() {
            tracing::info!("Installing");
            install.run().context("CMake install failed")?;
        }

        Ok(())
    }
}
