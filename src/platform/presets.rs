//! Predefined platform lists and the shortcut keywords that name them.

use super::{Arch, ArmVersion, Os, Platform};
use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// The most used platforms: Windows and Linux on 386, amd64 and ARMv5-7,
/// Linux on arm64, and macOS on amd64 and arm64.
pub fn common() -> Vec<Platform> {
    let arm = |os: Os, v: ArmVersion| Platform::new(os, Arch::ARM).with_arm(v);
    vec![
        Platform::new(Os::WINDOWS, Arch::I386),
        Platform::new(Os::WINDOWS, Arch::AMD64),
        arm(Os::WINDOWS, ArmVersion::V5),
        arm(Os::WINDOWS, ArmVersion::V6),
        arm(Os::WINDOWS, ArmVersion::V7),
        Platform::new(Os::LINUX, Arch::I386),
        Platform::new(Os::LINUX, Arch::AMD64),
        Platform::new(Os::LINUX, Arch::ARM64),
        arm(Os::LINUX, ArmVersion::V5),
        arm(Os::LINUX, ArmVersion::V6),
        arm(Os::LINUX, ArmVersion::V7),
        Platform::new(Os::DARWIN, Arch::AMD64),
        Platform::new(Os::DARWIN, Arch::ARM64),
    ]
}

/// A single empty descriptor: build for the host.
pub fn native() -> Vec<Platform> {
    vec![Platform::default()]
}

/// Keyword standing for a preset platform list in config files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Shortcut {
    /// [`common`]
    Common,
    /// [`native`]
    Native,
}

impl Shortcut {
    /// Every shortcut, in display order.
    pub const ALL: [Shortcut; 2] = [Shortcut::Common, Shortcut::Native];

    /// Keyword as written in config files.
    pub fn name(&self) -> &'static str {
        match self {
            Shortcut::Common => "common",
            Shortcut::Native => "native",
        }
    }

    /// Expand into the preset list.
    pub fn platforms(&self) -> Vec<Platform> {
        match self {
            Shortcut::Common => common(),
            Shortcut::Native => native(),
        }
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shortcut {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Shortcut::ALL
            .into_iter()
            .find(|shortcut| shortcut.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::InvalidShortcut {
                shortcut: s.to_string(),
                expected: Shortcut::ALL.map(|s| s.name()).join(", "),
            })
    }
}
