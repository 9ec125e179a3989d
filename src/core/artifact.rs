//! SDK artifact naming.

use std::fmt;
use std::str::FromStr;

use crate::core::error::SdkError;
use crate::core::platform::PlatformKey;

/// Product prefix of every VTK wheel SDK artifact.
pub const SDK_PREFIX: &str = "vtk-wheel-sdk";

/// SDK version used when neither the environment nor a config file picks one.
pub const DEFAULT_SDK_VERSION: &str = "9.2.5";

/// Archive extension of published SDKs.
pub const ARCHIVE_EXTENSION: &str = ".tar.xz";

/// Where published SDKs are downloaded from.
pub const DEFAULT_BASE_URL: &str = "https://vtk.org/files/wheel-sdks/";

/// A validated SDK version string.
///
/// Not necessarily semver. The version ends up in a directory name, so
/// separators and whitespace are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SdkVersion(String);

impl SdkVersion {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SdkVersion {
    fn default() -> Self {
        SdkVersion(DEFAULT_SDK_VERSION.to_string())
    }
}

impl FromStr for SdkVersion {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && s != "."
            && s != ".."
            && !s
                .chars()
                .any(|c| c.is_whitespace() || c == '/' || c == '\\' || c.is_control());

        if valid {
            Ok(SdkVersion(s.to_string()))
        } else {
            Err(SdkError::InvalidSdkVersion {
                value: s.to_string(),
            })
        }
    }
}

impl fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a published SDK build, also used as its cache directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactTag(String);

impl ArtifactTag {
    /// `{prefix}-{version}-{cpXY-cpXY}-{platform}`.
    pub fn new(version: &SdkVersion, platform: &PlatformKey) -> Self {
        ArtifactTag(format!(
            "{}-{}-{}-{}",
            SDK_PREFIX,
            version,
            platform.runtime.abi_tag(),
            platform.platform_suffix()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the downloadable archive.
    pub fn archive_name(&self) -> String {
        format!("{}{}", self.0, ARCHIVE_EXTENSION)
    }
}

impl fmt::Display for ArtifactTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
