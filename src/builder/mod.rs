//! Build configuration.
//!
//! Locates the SDK's CMake integration, assembles the superbuild options
//! and hands them to CMake.

pub mod args;
pub mod cmake;
pub mod locate;

pub use args::{assemble, AssemblyInputs, BuildConfig, CMakeDefine, CacheType};
pub use cmake::{BuildOrchestrator, CMakeOrchestrator};
pub use locate::{locate, locate_sdk_cmake_dir, select_unique};
