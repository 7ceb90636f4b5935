//! Command line argument parsing.

use crate::config;
use crate::error::{ConfigError, Result};
use crate::package::Compression;
use crate::platform::{Platform, Shortcut};
use crate::settings::{BuildSettings, SettingsBuilder};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cross-compile a Go program for many platforms and package the results
#[derive(Parser, Debug)]
#[command(
    name = "crossbuild",
    version,
    about = "Cross-compile a Go program for many platforms and package the results",
    long_about = "Build one binary per platform with the Go toolchain, name each after a
template and package it as a raw binary, tar.gz or zip archive.

Usage:
  crossbuild build --config build.json
  crossbuild build --source ./cmd/app --output-name 'app-{Version}' --shortcut common --compress auto
  crossbuild platforms --shortcut common"
)]
pub struct Args {
    /// Show detailed progress
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build and package every configured platform
    Build(BuildArgs),

    /// List the platforms of a preset
    Platforms {
        /// Preset to list
        #[arg(long, default_value = "common")]
        shortcut: Shortcut,
    },
}

impl Command {
    /// Name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Build(_) => "build",
            Command::Platforms { .. } => "platforms",
        }
    }
}

/// Options of the `build` command; each overrides the config file.
#[derive(clap::Args, Debug, Default)]
pub struct BuildArgs {
    /// JSON or TOML config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory of the main package
    #[arg(short, long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Output name template ({Version}, {OS} and {Arch} are replaced)
    #[arg(short = 'n', long, value_name = "TEMPLATE")]
    pub output_name: Option<String>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Remove the output directory first
    #[arg(long)]
    pub clean: bool,

    /// Enable cgo
    #[arg(long)]
    pub cgo: bool,

    /// raw, tar.gz, zip or auto
    #[arg(long, value_name = "MODE")]
    pub compress: Option<Compression>,

    /// Target platform as os/arch or os/arm/N (repeatable)
    #[arg(short, long = "platform", value_name = "OS/ARCH")]
    pub platforms: Vec<Platform>,

    /// Append a preset platform list: common or native
    #[arg(long, value_name = "NAME")]
    pub shortcut: Option<Shortcut>,

    /// Extra linker flags
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub ldflags: Option<String>,

    /// Extra compiler argument (repeatable)
    #[arg(long = "flag", value_name = "ARG", allow_hyphen_values = true)]
    pub flags: Vec<String>,

    /// Symbol receiving the git tag, e.g. main.Version
    #[arg(long, value_name = "SYMBOL")]
    pub version_symbol: Option<String>,

    /// Symbol receiving the commit hash, e.g. main.Hash
    #[arg(long, value_name = "SYMBOL")]
    pub hash_symbol: Option<String>,

    /// Environment override for every platform (repeatable)
    #[arg(short, long = "env", value_name = "KEY=VALUE", value_parser = parse_env)]
    pub envs: Vec<(String, String)>,

    /// Compiler program (default: go)
    #[arg(long, value_name = "PROGRAM")]
    pub compiler: Option<String>,

    /// Universal binary fusion tool (default: lipo)
    #[arg(long, value_name = "PROGRAM")]
    pub fusion_tool: Option<String>,
}

impl BuildArgs {
    /// Load the config file (if any) and apply command line overrides.
    pub async fn settings(&self) -> Result<BuildSettings> {
        let mut settings = match &self.config {
            Some(path) => config::load_settings(path).await?,
            None => BuildSettings::default(),
        };

        if let Some(source) = &self.source {
            settings.source = source.clone();
        }
        if let Some(name) = &self.output_name {
            settings.output_name = name.clone();
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        settings.clean_output |= self.clean;
        settings.cgo |= self.cgo;
        if let Some(compression) = self.compress {
            settings.compression = compression;
        }
        settings.platforms.extend(self.platforms.iter().cloned());
        if let Some(shortcut) = self.shortcut {
            settings.platforms.extend(shortcut.platforms());
        }
        if let Some(ldflags) = &self.ldflags {
            settings.extra_ld_flags = ldflags.clone();
        }
        settings.extra_flags.extend(self.flags.iter().cloned());
        if let Some(symbol) = &self.version_symbol {
            settings.version_symbol = Some(symbol.clone());
        }
        if let Some(symbol) = &self.hash_symbol {
            settings.hash_symbol = Some(symbol.clone());
        }
        settings.envs.extend(self.envs.iter().cloned());
        if let Some(compiler) = &self.compiler {
            settings.compiler = Some(compiler.clone());
        }
        if let Some(tool) = &self.fusion_tool {
            settings.fusion_tool = Some(tool.clone());
        }

        if settings.platforms.is_empty() {
            log::info!("No platforms given, building for the host");
            settings.platforms = Shortcut::Native.platforms();
        }

        SettingsBuilder::from_settings(settings).build()
    }
}

/// Parse `KEY=VALUE`.
fn parse_env(value: &str) -> anyhow::Result<(String, String)> {
    let (key, val) = value
        .split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .ok_or_else(|| ConfigError::InvalidEnv {
            value: value.to_string(),
        })?;
    Ok((key.trim().to_string(), val.to_string()))
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
