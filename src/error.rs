//! Error types for crossbuild operations.
//!
//! Errors fall into four groups: configuration problems (detected before any
//! process is spawned), toolchain failures (compiler or fusion tool exited
//! non-zero), and I/O failures (directory, file and archive operations).
//! Version-control lookups never fail from the caller's point of view, so
//! they have no variant here.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Result type alias for crossbuild operations
pub type Result<T> = std::result::Result<T, BuildError>;

/// Main error type returned by a build run
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BuildError {
    /// Invalid settings, platform combination or config file
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Compiler or fusion tool failure
    #[error("Toolchain error: {0}")]
    Toolchain(#[from] ToolchainError),

    /// File system error with path context.
    ///
    /// Created by [`ErrorExt::fs_context`].
    #[error("{context} {path}: {error}")]
    Fs {
        /// Operation that failed, e.g. "creating output directory"
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// IO errors without a specific path
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Zip archive creation error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A blocking packaging task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Configuration errors, always reported before any child process starts
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Universal binaries requested for an OS that has no fat binary format
    #[error("{os} does not support universal arch")]
    UniversalUnsupported {
        /// The offending OS tag
        os: String,
    },

    /// Unknown platform shortcut keyword
    #[error("Invalid platform shortcut '{shortcut}' (expected one of: {expected})")]
    InvalidShortcut {
        /// Keyword as written
        shortcut: String,
        /// Known keywords, comma separated
        expected: String,
    },

    /// Platform text that is not `os/arch[/arm]`
    #[error("Invalid platform '{value}': expected os/arch or os/arch/armversion")]
    InvalidPlatform {
        /// Text as written
        value: String,
    },

    /// Environment override that is not `KEY=VALUE`
    #[error("Invalid environment override '{value}': expected KEY=VALUE")]
    InvalidEnv {
        /// Text as written
        value: String,
    },

    /// A required setting was not provided
    #[error("Missing required setting: {field}")]
    MissingField {
        /// Setting name
        field: &'static str,
    },

    /// Source or output path cannot be made absolute
    #[error("Cannot resolve path {path}: {source}")]
    UnresolvablePath {
        /// Path as configured
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Config file extension is neither .json nor .toml
    #[error("Unsupported config format for {path} (expected .json or .toml)")]
    UnsupportedFormat {
        /// Config file path
        path: PathBuf,
    },

    /// Config file could not be parsed
    #[error("Failed to parse {path}: {reason}")]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Parser message
        reason: String,
    },
}

/// Failures of the external toolchain processes
#[derive(Error, Debug)]
pub enum ToolchainError {
    /// The process could not be started at all
    #[error("Failed to run {program}: {source}")]
    Spawn {
        /// Program name or path
        program: String,
        /// Underlying spawn error
        #[source]
        source: io::Error,
    },

    /// The compiler exited non-zero; `output` is its combined output
    #[error("{program} failed for {platform} ({status}), output:\n{output}")]
    CompilerFailed {
        /// Compiler program
        program: String,
        /// Platform being built
        platform: String,
        /// Exit status
        status: ExitStatus,
        /// Combined stdout and stderr
        output: String,
    },

    /// The fusion tool exited non-zero while creating a universal binary
    #[error("{tool} failed to create universal binary ({status}), output:\n{output}")]
    FusionFailed {
        /// Fusion tool program
        tool: String,
        /// Exit status
        status: ExitStatus,
        /// Combined stdout and stderr
        output: String,
    },
}

impl BuildError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            BuildError::Config(ConfigError::UniversalUnsupported { .. }) => vec![
                "Universal binaries are only available for darwin".to_string(),
                "Use darwin/universal, or list darwin/amd64 and darwin/arm64 separately".to_string(),
            ],
            BuildError::Config(ConfigError::InvalidShortcut { expected, .. }) => {
                vec![format!("Use one of the platform shortcuts: {expected}")]
            }
            BuildError::Config(ConfigError::MissingField { field }) => {
                vec![format!("Set '{field}' in the config file or on the command line")]
            }
            BuildError::Toolchain(ToolchainError::Spawn { program, .. }) => vec![
                format!("Ensure '{program}' is installed and on PATH"),
                "Override the compiler with --compiler or the 'compiler' setting".to_string(),
            ],
            BuildError::Toolchain(ToolchainError::CompilerFailed { .. }) => vec![
                "Read the compiler output above for the failing package".to_string(),
                "Cross-compiling with cgo needs a C cross compiler set per platform ('cc')"
                    .to_string(),
            ],
            BuildError::Toolchain(ToolchainError::FusionFailed { tool, .. }) => vec![format!(
                "Ensure '{tool}' is available (Xcode Command Line Tools provide lipo)"
            )],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g. "creating output directory", "opening artifact".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| BuildError::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_context_keeps_path_and_source() {
        let res: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = res.fs_context("opening artifact", "/tmp/x").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("opening artifact"));
        assert!(text.contains("/tmp/x"));
        assert!(text.contains("gone"));
    }

    #[test]
    fn universal_error_names_os() {
        let err = BuildError::from(ConfigError::UniversalUnsupported {
            os: "linux".to_string(),
        });
        assert!(err.to_string().contains("linux does not support universal arch"));
        assert!(!err.recovery_suggestions().is_empty());
    }
}
