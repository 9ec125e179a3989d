//! wheel-sdk - build dependency resolver for VTK external modules
//!
//! This crate resolves, fetches and configures everything needed to build
//! a VTK external module against a prebuilt VTK wheel SDK: the SDK archive
//! matching the host platform, the VTKExternalModule superbuild project and
//! the CMake cache options that tie them together.

pub mod builder;
pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities and fakes for unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides recording implementations of the fetch and
/// build capabilities, plus filesystem fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildConfig, CMakeDefine};
pub use core::{ArtifactTag, PlatformKey, SdkError, SdkVersion};
pub use ops::{ResolveContext, ResolvedBuild};
pub use util::{BuildEnv, Config};
