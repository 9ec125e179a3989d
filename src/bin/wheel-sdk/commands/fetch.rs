//! `wheel-sdk fetch` command

use anyhow::Result;

use crate::cli::{FetchArgs, GlobalArgs};

pub fn execute(args: FetchArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = super::resolve_context(global, args.python_version)?;
    let fetcher = super::network_fetcher(ctx.config())?;

    let deps = ctx.resolve_dependencies(&fetcher)?;

    eprintln!("     Resolved {}", deps.platform);
    println!("sdk:             {}", deps.sdk_dir.display());
    println!("sdk cmake:       {}", deps.sdk_cmake_dir.display());
    println!("external module: {}", deps.external_module_dir.display());

    Ok(())
}
