//! Host platform identification.

use crate::bundler::{Error, Result};
use std::fmt;

/// Operating systems a bundle can target.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Os {
    /// macOS
    Darwin,
    /// Linux (glibc)
    Linux,
}

/// CPU architectures a bundle can target.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Arch {
    /// AArch64 / Apple Silicon
    Arm64,
    /// x86_64 / AMD64
    X64,
}

/// Canonical `{os, arch}` identifier, e.g. `darwin-arm64`.
///
/// Selects the runtime download and names the output archive. Only the
/// closed set of [`Os`] × [`Arch`] is representable, so every key has an
/// entry in [`PlatformKey::runtime_target`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PlatformKey {
    /// Operating system
    pub os: Os,
    /// CPU architecture
    pub arch: Arch,
}

/// Every supported platform, in a stable order.
pub const SUPPORTED_PLATFORMS: [PlatformKey; 4] = [
    PlatformKey { os: Os::Darwin, arch: Arch::Arm64 },
    PlatformKey { os: Os::Darwin, arch: Arch::X64 },
    PlatformKey { os: Os::Linux, arch: Arch::Arm64 },
    PlatformKey { os: Os::Linux, arch: Arch::X64 },
];

impl Os {
    /// Parses a host OS identifier (`std::env::consts::OS` or `uname -s` style).
    pub fn parse(os: &str) -> Option<Self> {
        match os.to_ascii_lowercase().as_str() {
            "macos" | "darwin" => Some(Os::Darwin),
            "linux" => Some(Os::Linux),
            _ => None,
        }
    }

    /// Name used in platform keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Os::Darwin => "darwin",
            Os::Linux => "linux",
        }
    }
}

impl Arch {
    /// Parses a CPU identifier (`std::env::consts::ARCH` or `uname -m` style).
    pub fn parse(arch: &str) -> Option<Self> {
        match arch.to_ascii_lowercase().as_str() {
            "aarch64" | "arm64" => Some(Arch::Arm64),
            "x86_64" | "amd64" | "x64" => Some(Arch::X64),
            _ => None,
        }
    }

    /// Name used in platform keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::Arm64 => "arm64",
            Arch::X64 => "x64",
        }
    }
}

impl PlatformKey {
    /// Resolves the key of the machine running the build.
    ///
    /// Performs no filesystem access, so callers can resolve before creating
    /// anything and fail cleanly on unsupported hosts.
    pub fn detect() -> Result<Self> {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Maps raw OS and CPU identifiers to a key.
    pub fn from_parts(os: &str, arch: &str) -> Result<Self> {
        match (Os::parse(os), Arch::parse(arch)) {
            (Some(os), Some(arch)) => Ok(Self { os, arch }),
            _ => Err(Error::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            }),
        }
    }

    /// Target triple under which the external runtime publishes its builds.
    pub fn runtime_target(self) -> &'static str {
        match (self.os, self.arch) {
            (Os::Darwin, Arch::Arm64) => "aarch64-apple-darwin",
            (Os::Darwin, Arch::X64) => "x86_64-apple-darwin",
            (Os::Linux, Arch::Arm64) => "aarch64-unknown-linux-gnu",
            (Os::Linux, Arch::X64) => "x86_64-unknown-linux-gnu",
        }
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os.as_str(), self.arch.as_str())
    }
}

impl serde::Serialize for PlatformKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
