//! Build configuration.
//!
//! [`BuildSettings`] is the declarative description of one multi-platform
//! build: where the source is, how outputs are named and packaged, and which
//! platforms to build. It is never mutated by a run; everything derived
//! during a run lives in the builder's run context, so one settings value can
//! be reused (or shared) across runs.

use crate::error::{ConfigError, Result};
use crate::package::Compression;
use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default toolchain program.
pub const DEFAULT_COMPILER: &str = "go";

/// Default fusion tool for universal binaries.
pub const DEFAULT_FUSION_TOOL: &str = "lipo";

/// Default permissions for raw outputs.
pub const DEFAULT_OUTPUT_MODE: u32 = 0o755;

/// Multi-platform build description.
///
/// # Examples
///
/// ```
/// use crossbuild::{BuildSettings, Compression};
/// use crossbuild::platform::{Arch, Os, Platform};
///
/// let settings = BuildSettings::builder()
///     .source("./cmd/app")
///     .output_name("app-{Version}-{OS}-{Arch}")
///     .output_dir("./dist")
///     .compression(Compression::Auto)
///     .platform(Platform::new(Os::LINUX, Arch::AMD64))
///     .platform(Platform::new(Os::WINDOWS, Arch::AMD64))
///     .build()?;
/// assert_eq!(settings.platforms.len(), 2);
/// # Ok::<(), crossbuild::BuildError>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Compiler executable; `go` when unset
    pub compiler: Option<String>,

    /// Directory of the main package
    pub source: PathBuf,

    /// Output base name, may contain placeholders
    pub output_name: String,

    /// Directory receiving all artifacts
    pub output_dir: PathBuf,

    /// Remove `output_dir` before building
    pub clean_output: bool,

    /// Enable cgo; each platform's `cc` becomes the C compiler
    pub cgo: bool,

    /// Extra arguments passed to the compiler before the source path
    pub extra_flags: Vec<String>,

    /// Extra linker flags, e.g. `-s -w`
    pub extra_ld_flags: String,

    /// Symbol set to the nearest git tag, e.g. `main.Version`
    pub version_symbol: Option<String>,

    /// Symbol set to the HEAD commit hash, e.g. `main.Hash`
    pub hash_symbol: Option<String>,

    /// Packaging policy
    pub compression: Compression,

    /// Platforms to build, in order
    pub platforms: Vec<Platform>,

    /// Environment for every platform; platform `envs` win on collisions
    pub envs: BTreeMap<String, String>,

    /// Permissions applied to raw outputs
    pub output_mode: u32,

    /// Program fusing universal binaries; `lipo` when unset
    pub fusion_tool: Option<String>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            compiler: None,
            source: PathBuf::from("."),
            output_name: String::new(),
            output_dir: PathBuf::from("output"),
            clean_output: false,
            cgo: false,
            extra_flags: Vec::new(),
            extra_ld_flags: String::new(),
            version_symbol: None,
            hash_symbol: None,
            compression: Compression::Raw,
            platforms: Vec::new(),
            envs: BTreeMap::new(),
            output_mode: DEFAULT_OUTPUT_MODE,
            fusion_tool: None,
        }
    }
}

impl BuildSettings {
    /// Start a [`SettingsBuilder`].
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::new()
    }

    /// Compiler program to run.
    pub fn compiler_program(&self) -> &str {
        self.compiler
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COMPILER)
    }

    /// Fusion tool program to run.
    pub fn fusion_program(&self) -> &str {
        self.fusion_tool
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_FUSION_TOOL)
    }

    /// Check everything that can be checked before any process is spawned.
    pub fn validate(&self) -> Result<()> {
        if self.output_name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "output_name",
            }
            .into());
        }
        if self.platforms.is_empty() {
            return Err(ConfigError::MissingField { field: "platforms" }.into());
        }
        for platform in &self.platforms {
            platform.validate()?;
        }
        Ok(())
    }
}

/// Builder for [`BuildSettings`].
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    settings: BuildSettings,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Start from existing settings, e.g. loaded from a config file.
    pub fn from_settings(settings: BuildSettings) -> Self {
        Self { settings }
    }

    /// Sets the compiler executable.
    pub fn compiler(mut self, compiler: impl Into<String>) -> Self {
        self.settings.compiler = Some(compiler.into());
        self
    }

    /// Sets the source directory.
    pub fn source<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.settings.source = path.as_ref().to_path_buf();
        self
    }

    /// Sets the output name template.
    pub fn output_name(mut self, template: impl Into<String>) -> Self {
        self.settings.output_name = template.into();
        self
    }

    /// Sets the output directory.
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.settings.output_dir = path.as_ref().to_path_buf();
        self
    }

    /// Remove the output directory before building.
    pub fn clean_output(mut self, clean: bool) -> Self {
        self.settings.clean_output = clean;
        self
    }

    /// Enable cgo.
    pub fn cgo(mut self, cgo: bool) -> Self {
        self.settings.cgo = cgo;
        self
    }

    /// Append a compiler argument.
    pub fn extra_flag(mut self, flag: impl Into<String>) -> Self {
        self.settings.extra_flags.push(flag.into());
        self
    }

    /// Sets extra linker flags.
    pub fn extra_ld_flags(mut self, flags: impl Into<String>) -> Self {
        self.settings.extra_ld_flags = flags.into();
        self
    }

    /// Sets the symbol receiving the git tag.
    pub fn version_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.settings.version_symbol = Some(symbol.into());
        self
    }

    /// Sets the symbol receiving the commit hash.
    pub fn hash_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.settings.hash_symbol = Some(symbol.into());
        self
    }

    /// Sets the packaging policy.
    pub fn compression(mut self, compression: Compression) -> Self {
        self.settings.compression = compression;
        self
    }

    /// Append a platform.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.settings.platforms.push(platform);
        self
    }

    /// Append several platforms.
    pub fn platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.settings.platforms.extend(platforms);
        self
    }

    /// Add a global environment override.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.envs.insert(key.into(), value.into());
        self
    }

    /// Sets permissions for raw outputs.
    pub fn output_mode(mut self, mode: u32) -> Self {
        self.settings.output_mode = mode;
        self
    }

    /// Sets the universal binary fusion tool.
    pub fn fusion_tool(mut self, tool: impl Into<String>) -> Self {
        self.settings.fusion_tool = Some(tool.into());
        self
    }

    /// Builds and validates the settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the output name or platform list is
    /// empty, or if a platform combination is invalid.
    pub fn build(self) -> Result<BuildSettings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use crate::platform::{Arch, Os};

    #[test]
    fn defaults_fill_in_programs() {
        let settings = BuildSettings::default();
        assert_eq!(settings.compiler_program(), "go");
        assert_eq!(settings.fusion_program(), "lipo");
        assert_eq!(settings.output_mode, 0o755);

        let settings = BuildSettings {
            compiler: Some("go1.22".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.compiler_program(), "go1.22");
    }

    #[test]
    fn builder_rejects_missing_fields() {
        let err = SettingsBuilder::new()
            .platform(Platform::default())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Config(ConfigError::MissingField { field: "output_name" })
        ));

        let err = SettingsBuilder::new().output_name("app").build().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Config(ConfigError::MissingField { field: "platforms" })
        ));
    }

    #[test]
    fn builder_rejects_universal_off_darwin() {
        let err = SettingsBuilder::new()
            .output_name("app")
            .platform(Platform::new(Os::LINUX, Arch::AMD64))
            .platform(Platform::new(Os::WINDOWS, Arch::UNIVERSAL))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("windows does not support universal arch"));
    }
}
