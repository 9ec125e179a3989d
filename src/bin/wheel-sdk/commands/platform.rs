//! `wheel-sdk platform` command

use anyhow::Result;

use crate::cli::{GlobalArgs, PlatformArgs};
use wheel_sdk::core::{ArtifactTag, SdkVersion};

pub fn execute(args: PlatformArgs, global: &GlobalArgs) -> Result<()> {
    let mut ctx = super::resolve_context(global, args.python_version)?;
    if args.os.is_some() || args.arch.is_some() {
        ctx = ctx.with_host(
            args.os.unwrap_or_else(|| std::env::consts::OS.to_string()),
            args.arch.unwrap_or_else(|| std::env::consts::ARCH.to_string()),
        );
    }

    let platform = ctx.platform()?;
    let version = match &args.sdk_version {
        Some(raw) => raw.parse::<SdkVersion>()?,
        None => ctx.sdk_version()?,
    };
    let tag = ArtifactTag::new(&version, &platform);
    let url = ctx.artifact_cache()?.archive_url(&tag)?;

    println!("platform: {}", platform);
    println!("tag:      {}", tag);
    println!("url:      {}", url);

    Ok(())
}
