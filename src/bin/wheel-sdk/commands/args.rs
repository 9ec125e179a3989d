//! `wheel-sdk args` command

use anyhow::Result;

use crate::cli::{ArgsArgs, GlobalArgs};

pub fn execute(args: ArgsArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = super::resolve_context(global, args.python_version)?;
    let fetcher = super::network_fetcher(ctx.config())?;

    let resolved = ctx.resolve_build(&fetcher)?;
    let config = &resolved.config;

    if args.json {
        let output = serde_json::json!({
            "source_dir": config.source_dir,
            "args": config.to_args(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for arg in config.to_args() {
            println!("{}", arg);
        }
    }

    Ok(())
}
