//! `wheel-sdk clean` command

use anyhow::Result;

use crate::cli::{CleanArgs, GlobalArgs};
use wheel_sdk::ops;

pub fn execute(_args: CleanArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = super::resolve_context(global, None)?;

    let removed = ops::clean(&ctx)?;
    eprintln!("     Removed {}", removed.display());

    Ok(())
}
