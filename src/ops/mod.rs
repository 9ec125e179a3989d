//! High-level operations.
//!
//! This module contains the implementation of wheel-sdk commands.

pub mod resolve;

pub use resolve::{build, clean, ResolveContext, ResolvedBuild, ResolvedDependencies};
