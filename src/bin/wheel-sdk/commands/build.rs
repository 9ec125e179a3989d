//! `wheel-sdk build` command

use anyhow::Result;

use crate::cli::{BuildArgs, GlobalArgs};
use wheel_sdk::builder::CMakeOrchestrator;
use wheel_sdk::ops;
use wheel_sdk::util::fs::absolutize;
use wheel_sdk::util::process::find_cmake;

pub fn execute(args: BuildArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = super::resolve_context(global, args.python_version)?;
    let settings = &ctx.config().build;
    let fetcher = super::network_fetcher(ctx.config())?;

    let resolved = ctx.resolve_build(&fetcher)?;

    // CLI > config > default
    let build_dir = args
        .build_dir
        .or_else(|| settings.build_dir.clone())
        .unwrap_or_else(|| "build".into());
    let install_prefix = args
        .install_prefix
        .or_else(|| settings.install_prefix.clone())
        .map(|p| absolutize(ctx.project_dir(), &p));

    let mut orchestrator = CMakeOrchestrator::new(
        find_cmake(settings.cmake.as_deref())?,
        absolutize(ctx.project_dir(), &build_dir),
    )
    .install_prefix(install_prefix);
    if let Some(build_type) = args.build_type.or_else(|| settings.build_type.clone()) {
        orchestrator = orchestrator.build_type(build_type);
    }

    ops::build(&resolved, &orchestrator)?;

    eprintln!("    Finished {}", orchestrator.build_dir().display());
    Ok(())
}
