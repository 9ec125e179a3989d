//! Core data types: platforms, artifact names and the error taxonomy.

pub mod artifact;
pub mod error;
pub mod platform;

pub use artifact::{ArtifactTag, SdkVersion};
pub use error::SdkError;
pub use platform::{CpuArch, OsFamily, PlatformKey, RuntimeVersion};
