//! Compiler invocation.
//!
//! [`Toolchain`] turns one [`Platform`] into an [`Invocation`] (program,
//! arguments, explicit environment, working directory) and runs it. The
//! child inherits this process's environment; the explicit layers are
//! applied on top, so they always win:
//!
//! 1. `CGO_ENABLED=0`, or `1` when cgo is enabled
//! 2. `CC` from the platform, when set
//! 3. `GOOS`, `GOARCH`, `GOARM` from the platform (empty when absent)
//! 4. global overrides from the settings
//! 5. per-platform overrides

pub mod universal;

use crate::error::{Result, ToolchainError};
use crate::git::VersionInfo;
use crate::platform::Platform;
use crate::settings::BuildSettings;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Native interop switch
pub const ENV_CGO: &str = "CGO_ENABLED";
/// C compiler used by cgo
pub const ENV_CC: &str = "CC";
/// Target OS
pub const ENV_GOOS: &str = "GOOS";
/// Target architecture
pub const ENV_GOARCH: &str = "GOARCH";
/// Target ARM revision
pub const ENV_GOARM: &str = "GOARM";

/// Build the linker flag string for a run.
///
/// `extra_ld_flags` first, then one `-X` injection per known value whose
/// symbol is configured. Empty pieces are dropped.
pub fn linker_flags(settings: &BuildSettings, version: &VersionInfo) -> String {
    let inject = |symbol: &Option<String>, value: &Option<String>| match (symbol, value) {
        (Some(symbol), Some(value)) if !symbol.is_empty() => {
            Some(format!("-X '{symbol}={value}'"))
        }
        _ => None,
    };

    std::iter::once(Some(settings.extra_ld_flags.trim().to_string()))
        .chain([
            inject(&settings.version_symbol, &version.tag),
            inject(&settings.hash_symbol, &version.hash),
        ])
        .flatten()
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Explicit environment for one platform, in precedence order.
pub fn explicit_env(settings: &BuildSettings, platform: &Platform) -> BTreeMap<String, String> {
    let mut envs = BTreeMap::new();

    let cgo = if settings.cgo { "1" } else { "0" };
    envs.insert(ENV_CGO.to_string(), cgo.to_string());

    if let Some(cc) = platform.cc.as_deref().filter(|cc| !cc.is_empty()) {
        envs.insert(ENV_CC.to_string(), cc.to_string());
    }

    let tag = |value: Option<&str>| value.unwrap_or_default().to_string();
    envs.insert(
        ENV_GOOS.to_string(),
        tag(platform.target_os().map(|os| os.as_str())),
    );
    envs.insert(
        ENV_GOARCH.to_string(),
        tag(platform.target_arch().map(|arch| arch.as_str())),
    );
    envs.insert(
        ENV_GOARM.to_string(),
        tag(platform.arm_version().map(|arm| arm.as_str())),
    );

    envs.extend(settings.envs.clone());
    envs.extend(platform.envs.clone());
    envs
}

/// A fully composed compiler command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    /// Program to execute
    pub program: String,
    /// Arguments, in order
    pub args: Vec<OsString>,
    /// Explicit environment, applied over the inherited one
    pub envs: BTreeMap<String, String>,
    /// Working directory
    pub current_dir: PathBuf,
}

impl Invocation {
    /// Run to completion, failing with the combined output on non-zero exit.
    ///
    /// The combined output is stdout followed by stderr. Both streams are
    /// captured separately, so their relative order is not preserved.
    pub async fn run(&self, platform: &Platform) -> Result<()> {
        log::debug!(
            "Running {} {:?} in {} with {:?}",
            self.program,
            self.args,
            self.current_dir.display(),
            self.envs
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .envs(&self.envs)
            .current_dir(&self.current_dir)
            .output()
            .await
            .map_err(|source| ToolchainError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(ToolchainError::CompilerFailed {
                program: self.program.clone(),
                platform: platform.to_string(),
                status: output.status,
                output: combined,
            }
            .into());
        }
        Ok(())
    }
}

/// Compiler bound to one run: settings, resolved source and linker flags.
#[derive(Debug)]
pub struct Toolchain<'a> {
    settings: &'a BuildSettings,
    source: &'a Path,
    ldflags: &'a str,
}

impl<'a> Toolchain<'a> {
    /// `source` must already be absolute.
    pub fn new(settings: &'a BuildSettings, source: &'a Path, ldflags: &'a str) -> Self {
        Self {
            settings,
            source,
            ldflags,
        }
    }

    /// The settings this toolchain was created from.
    pub fn settings(&self) -> &BuildSettings {
        self.settings
    }

    /// Compose the command building `platform` into `output`.
    pub fn invocation(&self, platform: &Platform, output: &Path) -> Invocation {
        let mut args: Vec<OsString> = vec![
            "build".into(),
            "-ldflags".into(),
            self.ldflags.into(),
            "-o".into(),
            output.into(),
        ];
        args.extend(self.settings.extra_flags.iter().map(OsString::from));
        args.push(self.source.into());

        Invocation {
            program: self.settings.compiler_program().to_string(),
            args,
            envs: explicit_env(self.settings, platform),
            current_dir: self.source.to_path_buf(),
        }
    }

    /// Compile `platform` to `output`, returning the artifact path.
    pub async fn compile(&self, platform: &Platform, output: &Path) -> Result<PathBuf> {
        log::info!("Compiling {platform}");
        self.invocation(platform, output).run(platform).await?;
        Ok(output.to_path_buf())
    }
}
