//! # crossbuild
//!
//! Cross-compilation build orchestrator for Go programs.
//!
//! Given one [`BuildSettings`], crossbuild invokes the Go toolchain once per
//! target platform, names every output after a template, and packages it as
//! a raw executable, a tar.gz or a zip archive.
//!
//! ## Features
//!
//! - **Name templates**: `{Version}`, `{OS}` and `{Arch}` placeholders, with
//!   automatic disambiguation when several platforms are built
//! - **Version injection**: nearest git tag and commit hash linked into the
//!   binary via `-X`, read with gix (no git CLI)
//! - **Environment layering**: inherited environment, cgo toggle, C compiler,
//!   target tags, global and per-platform overrides
//! - **Packaging**: raw, tar.gz, zip, or automatic per OS
//! - **Universal binaries**: `darwin/universal` built twice and fused with `lipo`
//! - **Scoped temp storage**: intermediate binaries never outlive a run
//!
//! ## Usage
//!
//! ```bash
//! crossbuild build --config build.json
//! crossbuild build -s ./cmd/app -n 'app-{Version}' --shortcut common --compress auto
//! crossbuild platforms --shortcut common
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod naming;
pub mod package;
pub mod platform;
pub mod settings;
pub mod toolchain;

pub use builder::{BuildPhase, Builder, BuiltArtifact};
pub use error::{BuildError, ConfigError, Result, ToolchainError};
pub use package::Compression;
pub use platform::{Arch, ArmVersion, Os, Platform, Shortcut};
pub use settings::{BuildSettings, SettingsBuilder};
