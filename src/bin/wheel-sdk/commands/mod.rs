//! Command implementations

pub mod args;
pub mod build;
pub mod clean;
pub mod fetch;
pub mod platform;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use wheel_sdk::core::RuntimeVersion;
use wheel_sdk::sources::{GitSource, NetworkFetcher};
use wheel_sdk::util::config::{global_config_path, load_config, project_config_path};
use wheel_sdk::util::{BuildEnv, Config};
use wheel_sdk::ResolveContext;

/// The project directory, from the flag or the current directory.
pub fn project_dir(global: &GlobalArgs) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    Ok(match &global.project_dir {
        Some(dir) => wheel_sdk::util::fs::absolutize(&cwd, dir),
        None => cwd,
    })
}

/// Build the resolution context: environment, then layered config files.
pub fn resolve_context(
    global: &GlobalArgs,
    python_version: Option<RuntimeVersion>,
) -> Result<ResolveContext> {
    let project_dir = project_dir(global)?;
    let config = load_config(
        global_config_path().as_deref(),
        &project_config_path(&project_dir),
    );

    Ok(
        ResolveContext::new(project_dir, BuildEnv::capture(), config)
            .with_python_version(python_version)
            .offline(global.offline),
    )
}

/// Fetcher configured from `[build]`, `[sdk]` and `[external_module]`.
pub fn network_fetcher(config: &Config) -> Result<NetworkFetcher> {
    let source = GitSource {
        url: config.external_module.url().to_string(),
        rev: config.external_module.rev.clone(),
    };

    Ok(NetworkFetcher::new(config.build.cmake.clone(), source)?
        .with_checksums(config.sdk.checksums.clone()))
}
