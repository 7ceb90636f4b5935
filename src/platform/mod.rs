//! Compile target descriptors.
//!
//! A [`Platform`] names one compile target: an OS tag, an architecture tag,
//! an optional ARM revision, an optional C compiler and optional extra
//! environment variables. Tags are open strings (the toolchain decides what
//! is valid); well-known values are provided as constants.
//!
//! An empty OS or architecture means "the host's": the toolchain picks its
//! default and the output name falls back to [`Os::host`] / [`Arch::host`].

mod presets;

pub use presets::{Shortcut, common, native};

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Operating system tag (`GOOS`).
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Os(Cow<'static, str>);

impl Os {
    /// IBM AIX
    pub const AIX: Os = Os(Cow::Borrowed("aix"));
    /// Android
    pub const ANDROID: Os = Os(Cow::Borrowed("android"));
    /// macOS
    pub const DARWIN: Os = Os(Cow::Borrowed("darwin"));
    /// DragonFly BSD
    pub const DRAGONFLY: Os = Os(Cow::Borrowed("dragonfly"));
    /// FreeBSD
    pub const FREEBSD: Os = Os(Cow::Borrowed("freebsd"));
    /// illumos
    pub const ILLUMOS: Os = Os(Cow::Borrowed("illumos"));
    /// iOS
    pub const IOS: Os = Os(Cow::Borrowed("ios"));
    /// JavaScript/WebAssembly host
    pub const JS: Os = Os(Cow::Borrowed("js"));
    /// Linux
    pub const LINUX: Os = Os(Cow::Borrowed("linux"));
    /// NetBSD
    pub const NETBSD: Os = Os(Cow::Borrowed("netbsd"));
    /// OpenBSD
    pub const OPENBSD: Os = Os(Cow::Borrowed("openbsd"));
    /// Plan 9
    pub const PLAN9: Os = Os(Cow::Borrowed("plan9"));
    /// Solaris
    pub const SOLARIS: Os = Os(Cow::Borrowed("solaris"));
    /// Windows
    pub const WINDOWS: Os = Os(Cow::Borrowed("windows"));

    /// Create an OS tag from arbitrary text.
    pub fn new(tag: impl Into<String>) -> Self {
        Os(Cow::Owned(tag.into()))
    }

    /// The OS this process runs on, in toolchain naming.
    pub fn host() -> Self {
        match std::env::consts::OS {
            "macos" => Os::DARWIN,
            other => Os::new(other),
        }
    }

    /// Tag text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty tag.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when executables for this OS need an `.exe` suffix.
    pub fn is_windows(&self) -> bool {
        *self == Os::WINDOWS
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Architecture tag (`GOARCH`).
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arch(Cow<'static, str>);

impl Arch {
    /// 32-bit x86
    pub const I386: Arch = Arch(Cow::Borrowed("386"));
    /// x86_64
    pub const AMD64: Arch = Arch(Cow::Borrowed("amd64"));
    /// 32-bit ARM, see [`ArmVersion`]
    pub const ARM: Arch = Arch(Cow::Borrowed("arm"));
    /// AArch64
    pub const ARM64: Arch = Arch(Cow::Borrowed("arm64"));
    /// LoongArch 64
    pub const LOONG64: Arch = Arch(Cow::Borrowed("loong64"));
    /// MIPS big endian
    pub const MIPS: Arch = Arch(Cow::Borrowed("mips"));
    /// MIPS little endian
    pub const MIPSLE: Arch = Arch(Cow::Borrowed("mipsle"));
    /// MIPS64 big endian
    pub const MIPS64: Arch = Arch(Cow::Borrowed("mips64"));
    /// MIPS64 little endian
    pub const MIPS64LE: Arch = Arch(Cow::Borrowed("mips64le"));
    /// PowerPC 64 big endian
    pub const PPC64: Arch = Arch(Cow::Borrowed("ppc64"));
    /// PowerPC 64 little endian
    pub const PPC64LE: Arch = Arch(Cow::Borrowed("ppc64le"));
    /// RISC-V 64
    pub const RISCV64: Arch = Arch(Cow::Borrowed("riscv64"));
    /// IBM Z
    pub const S390X: Arch = Arch(Cow::Borrowed("s390x"));
    /// WebAssembly
    pub const WASM: Arch = Arch(Cow::Borrowed("wasm"));
    /// macOS fat binary containing amd64 and arm64 code.
    ///
    /// Not a real toolchain architecture: the builder expands it into two
    /// sub-builds and fuses the results.
    pub const UNIVERSAL: Arch = Arch(Cow::Borrowed("universal"));

    /// Create an architecture tag from arbitrary text.
    pub fn new(tag: impl Into<String>) -> Self {
        Arch(Cow::Owned(tag.into()))
    }

    /// The architecture this process runs on, in toolchain naming.
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "x86_64" => Arch::AMD64,
            "x86" => Arch::I386,
            "aarch64" => Arch::ARM64,
            "powerpc64" => Arch::PPC64,
            "loongarch64" => Arch::LOONG64,
            other => Arch::new(other),
        }
    }

    /// Tag text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty tag.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ARM revision (`GOARM`), only meaningful with [`Arch::ARM`].
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArmVersion(Cow<'static, str>);

impl ArmVersion {
    /// ARMv5
    pub const V5: ArmVersion = ArmVersion(Cow::Borrowed("5"));
    /// ARMv6
    pub const V6: ArmVersion = ArmVersion(Cow::Borrowed("6"));
    /// ARMv7
    pub const V7: ArmVersion = ArmVersion(Cow::Borrowed("7"));

    /// Create an ARM revision from arbitrary text.
    pub fn new(tag: impl Into<String>) -> Self {
        ArmVersion(Cow::Owned(tag.into()))
    }

    /// Revision text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One compile target.
///
/// # Examples
///
/// ```
/// use crossbuild::platform::{Arch, ArmVersion, Os, Platform};
///
/// let pi = Platform::new(Os::LINUX, Arch::ARM).with_arm(ArmVersion::V7);
/// assert_eq!(pi.to_string(), "linux/arm/7");
/// assert_eq!(pi.arch_label().as_deref(), Some("arm7"));
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Platform {
    /// Target OS; `None` or empty builds for the host OS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<Os>,

    /// Target architecture; `None` or empty builds for the host architecture
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<Arch>,

    /// ARM revision, ignored unless `arch` is [`Arch::ARM`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arm: Option<ArmVersion>,

    /// C compiler used when cgo is enabled (`CC`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,

    /// Extra environment for this platform only; wins over global overrides
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub envs: BTreeMap<String, String>,
}

impl Platform {
    /// Create a descriptor for `os`/`arch`.
    pub fn new(os: Os, arch: Arch) -> Self {
        Self {
            os: Some(os),
            arch: Some(arch),
            ..Default::default()
        }
    }

    /// Set the ARM revision.
    pub fn with_arm(mut self, arm: ArmVersion) -> Self {
        self.arm = Some(arm);
        self
    }

    /// Set the C compiler.
    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = Some(cc.into());
        self
    }

    /// Add a platform specific environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.insert(key.into(), value.into());
        self
    }

    /// The OS tag, treating an empty tag as absent.
    pub fn target_os(&self) -> Option<&Os> {
        self.os.as_ref().filter(|os| !os.is_empty())
    }

    /// The architecture tag, treating an empty tag as absent.
    pub fn target_arch(&self) -> Option<&Arch> {
        self.arch.as_ref().filter(|arch| !arch.is_empty())
    }

    /// The ARM revision, only when the architecture is 32-bit ARM.
    pub fn arm_version(&self) -> Option<&ArmVersion> {
        match self.target_arch() {
            Some(arch) if *arch == Arch::ARM => {
                self.arm.as_ref().filter(|arm| !arm.as_str().is_empty())
            }
            _ => None,
        }
    }

    /// Architecture plus ARM revision, e.g. `arm7` or `amd64`.
    pub fn arch_label(&self) -> Option<String> {
        self.target_arch().map(|arch| match self.arm_version() {
            Some(arm) => format!("{arch}{arm}"),
            None => arch.to_string(),
        })
    }

    /// True when this descriptor asks for a fused multi-architecture binary.
    pub fn is_universal(&self) -> bool {
        self.target_arch() == Some(&Arch::UNIVERSAL)
    }

    /// Reject combinations the builder cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_universal() && self.target_os() != Some(&Os::DARWIN) {
            // Named as written: an empty OS is not resolved to the host here.
            let os = self
                .target_os()
                .map_or_else(|| "native".to_string(), Os::to_string);
            return Err(ConfigError::UniversalUnsupported { os });
        }
        Ok(())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.target_os(), self.target_arch()) {
            (None, None) => f.write_str("native"),
            (os, arch) => {
                let os = os.cloned().unwrap_or_else(Os::host);
                let arch = arch.cloned().unwrap_or_else(Arch::host);
                write!(f, "{os}/{arch}")?;
                if let Some(arm) = self.arm_version() {
                    write!(f, "/{arm}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    /// Parse `native`, `os/arch` or `os/arch/armversion`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidPlatform {
            value: s.to_string(),
        };

        if s.trim() == "native" {
            return Ok(Platform::default());
        }

        let parts: Vec<&str> = s.trim().split('/').collect();
        match parts.as_slice() {
            [os, arch] if !os.is_empty() && !arch.is_empty() => {
                Ok(Platform::new(Os::new(*os), Arch::new(*arch)))
            }
            [os, arch, arm] if !os.is_empty() && *arch == "arm" && !arm.is_empty() => {
                Ok(Platform::new(Os::new(*os), Arch::ARM).with_arm(ArmVersion::new(*arm)))
            }
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_revision_ignored_for_other_arches() {
        let p = Platform::new(Os::LINUX, Arch::AMD64).with_arm(ArmVersion::V7);
        assert_eq!(p.arm_version(), None);
        assert_eq!(p.arch_label().as_deref(), Some("amd64"));

        let p = Platform::new(Os::LINUX, Arch::ARM).with_arm(ArmVersion::V6);
        assert_eq!(p.arch_label().as_deref(), Some("arm6"));
    }

    #[test]
    fn empty_tags_are_absent() {
        let p = Platform {
            os: Some(Os::new("")),
            arch: Some(Arch::new("")),
            ..Default::default()
        };
        assert_eq!(p.target_os(), None);
        assert_eq!(p.arch_label(), None);
        assert_eq!(p.to_string(), "native");
    }

    #[test]
    fn universal_only_on_darwin() {
        assert!(Platform::new(Os::DARWIN, Arch::UNIVERSAL).validate().is_ok());

        let err = Platform::new(Os::LINUX, Arch::UNIVERSAL)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UniversalUnsupported { ref os } if os == "linux"));

        let hostless = Platform {
            arch: Some(Arch::UNIVERSAL),
            ..Default::default()
        };
        let err = hostless.validate().unwrap_err();
        assert!(matches!(err, ConfigError::UniversalUnsupported { ref os } if os == "native"));
    }

    #[test]
    fn parse_and_display() {
        let p: Platform = "windows/amd64".parse().unwrap();
        assert_eq!(p, Platform::new(Os::WINDOWS, Arch::AMD64));
        assert_eq!(p.to_string(), "windows/amd64");

        let p: Platform = "linux/arm/5".parse().unwrap();
        assert_eq!(p.arm_version(), Some(&ArmVersion::V5));
        assert_eq!(p.to_string(), "linux/arm/5");

        assert_eq!("native".parse::<Platform>().unwrap(), Platform::default());
        assert!("linux".parse::<Platform>().is_err());
        assert!("linux/amd64/7".parse::<Platform>().is_err());
        assert!("/amd64".parse::<Platform>().is_err());
    }

    #[test]
    fn host_tags_use_toolchain_names() {
        let os = Os::host();
        assert_ne!(os.as_str(), "macos");
        let arch = Arch::host();
        assert_ne!(arch.as_str(), "x86_64");
        assert_ne!(arch.as_str(), "aarch64");
    }

    #[test]
    fn deserializes_sparse_json() {
        let p: Platform =
            serde_json::from_str(r#"{"os":"linux","arch":"arm","arm":"7","envs":{"A":"1"}}"#)
                .unwrap();
        assert_eq!(p.arch_label().as_deref(), Some("arm7"));
        assert_eq!(p.envs.get("A").map(String::as_str), Some("1"));

        let p: Platform = serde_json::from_str("{}").unwrap();
        assert_eq!(p, Platform::default());
    }
}
