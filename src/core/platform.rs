//! Platform detection and normalization.
//!
//! Maps the host (or a requested) operating system, CPU architecture and
//! Python version onto the naming scheme used by the VTK wheel SDK
//! distribution. Nothing in this module touches the filesystem or the
//! network.

use std::fmt;
use std::str::FromStr;

use crate::core::error::SdkError;

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Linux,
    MacOs,
    Windows,
}

impl OsFamily {
    /// Parse an OS name as reported by `std::env::consts::OS` or by Python's
    /// `sys.platform`.
    pub fn from_os_name(name: &str) -> Result<Self, SdkError> {
        match name.to_ascii_lowercase().as_str() {
            "linux" => Ok(OsFamily::Linux),
            "macos" | "darwin" => Ok(OsFamily::MacOs),
            "windows" | "win32" => Ok(OsFamily::Windows),
            _ => Err(SdkError::UnsupportedPlatform {
                kind: "operating system",
                value: name.to_string(),
            }),
        }
    }

    /// The family of the running host.
    pub fn host() -> Result<Self, SdkError> {
        Self::from_os_name(std::env::consts::OS)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Linux => "linux",
            OsFamily::MacOs => "macos",
            OsFamily::Windows => "windows",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuArch {
    X86_64,
    Arm64,
}

impl CpuArch {
    /// Parse an architecture name (`x86_64`, `amd64`, `aarch64`, `arm64`, ...).
    pub fn from_arch_name(name: &str) -> Result<Self, SdkError> {
        match name.to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" | "x64" => Ok(CpuArch::X86_64),
            "aarch64" | "arm64" => Ok(CpuArch::Arm64),
            _ => Err(SdkError::UnsupportedPlatform {
                kind: "CPU architecture",
                value: name.to_string(),
            }),
        }
    }

    /// The architecture of the running host.
    pub fn host() -> Result<Self, SdkError> {
        Self::from_arch_name(std::env::consts::ARCH)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CpuArch::X86_64 => "x86_64",
            CpuArch::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for CpuArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CPython `major.minor` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
}

impl RuntimeVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        RuntimeVersion { major, minor }
    }

    /// The `cpXY-cpXY` wheel tag fragment.
    ///
    /// Interpreters older than 3.8 carry the `m` (pymalloc) ABI suffix.
    pub fn abi_tag(&self) -> String {
        let digits = format!("{}{}", self.major, self.minor);
        let mut tag = format!("cp{digits}-cp{digits}");
        if *self < RuntimeVersion::new(3, 8) {
            tag.push('m');
        }
        tag
    }
}

impl FromStr for RuntimeVersion {
    type Err = SdkError;

    /// Accepts `3.10` and `3.10.4`; anything past the minor number is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SdkError::InvalidRuntimeVersion {
            value: s.to_string(),
        };

        let mut parts = s.trim().split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        let minor = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(invalid)?;

        Ok(RuntimeVersion::new(major, minor))
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The platform an SDK artifact is selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformKey {
    pub os: OsFamily,
    pub arch: CpuArch,
    pub runtime: RuntimeVersion,
}

impl PlatformKey {
    /// Build a key.
    ///
    /// `force_arm64` reflects a cross-compilation request (`ARCHFLAGS`); on
    /// macOS it selects arm64 even when the host reports x86_64. It has no
    /// effect elsewhere.
    pub fn new(os: OsFamily, arch: CpuArch, runtime: RuntimeVersion, force_arm64: bool) -> Self {
        let arch = if os == OsFamily::MacOs && force_arm64 {
            CpuArch::Arm64
        } else {
            arch
        };

        PlatformKey { os, arch, runtime }
    }

    /// Build a key from OS and architecture names.
    pub fn from_names(
        os_name: &str,
        arch_name: &str,
        runtime: RuntimeVersion,
        force_arm64: bool,
    ) -> Result<Self, SdkError> {
        let os = OsFamily::from_os_name(os_name)?;
        let arch = CpuArch::from_arch_name(arch_name)?;
        Ok(Self::new(os, arch, runtime, force_arm64))
    }

    /// Key for the running host.
    pub fn host(runtime: RuntimeVersion, force_arm64: bool) -> Result<Self, SdkError> {
        Self::from_names(
            std::env::consts::OS,
            std::env::consts::ARCH,
            runtime,
            force_arm64,
        )
    }

    /// Wheel platform tag of the SDK build for this key.
    ///
    /// Only one linux and one windows flavour are published upstream, so the
    /// architecture only matters on macOS.
    pub fn platform_suffix(&self) -> &'static str {
        match (self.os, self.arch) {
            (OsFamily::Linux, _) => "manylinux_2_17_x86_64.manylinux2014_x86_64",
            (OsFamily::MacOs, CpuArch::Arm64) => "macosx_11_0_arm64",
            (OsFamily::MacOs, CpuArch::X86_64) => "macosx_10_10_x86_64",
            (OsFamily::Windows, _) => "win_amd64",
        }
    }

    /// Whether the published SDK actually targets this key's architecture.
    pub fn has_native_sdk(&self) -> bool {
        self.os == OsFamily::MacOs || self.arch == CpuArch::X86_64
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} (python {})", self.os, self.arch, self.runtime)
    }
}
