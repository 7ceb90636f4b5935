//! Build orchestration.
//!
//! [`Builder`] runs the whole pipeline for one [`BuildSettings`]:
//!
//! 1. Validate every platform (no process is spawned for a bad config)
//! 2. Prepare a [`RunContext`]: paths, output and temp directories, version
//!    metadata, linker flags
//! 3. For each platform, in order: compile (or build and fuse a universal
//!    binary), resolve the artifact name, package into the output directory
//! 4. Remove the temp directory and return one [`BuiltArtifact`] per platform
//!
//! The first failing platform stops the run; later platforms are never
//! attempted.
//!
//! # Example
//!
//! ```no_run
//! use crossbuild::{BuildSettings, Builder, Compression};
//! use crossbuild::platform::Shortcut;
//!
//! # async fn example() -> crossbuild::Result<()> {
//! let settings = BuildSettings::builder()
//!     .source("./cmd/app")
//!     .output_name("app-{Version}")
//!     .output_dir("./dist")
//!     .compression(Compression::Auto)
//!     .platforms(Shortcut::Common.platforms())
//!     .build()?;
//!
//! for artifact in Builder::new(settings).run().await? {
//!     println!("{} -> {} ({} bytes)", artifact.platform, artifact.path.display(), artifact.size);
//!     println!("SHA256: {}", artifact.checksum);
//! }
//! # Ok(())
//! # }
//! ```

mod context;

pub use context::RunContext;

use crate::error::{ErrorExt, Result};
use crate::naming::{ResolvedName, resolve_name};
use crate::package::Packager;
use crate::platform::Platform;
use crate::settings::BuildSettings;
use crate::toolchain::{Toolchain, universal};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a run currently is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildPhase {
    /// Not started
    Idle,
    /// Creating the run context
    Preparing,
    /// Building platform `i`
    PerPlatform(usize),
    /// Every platform built and packaged
    Done,
    /// Stopped at the first error
    Failed,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildPhase::Idle => f.write_str("idle"),
            BuildPhase::Preparing => f.write_str("preparing"),
            BuildPhase::PerPlatform(i) => write!(f, "platform #{i}"),
            BuildPhase::Done => f.write_str("done"),
            BuildPhase::Failed => f.write_str("failed"),
        }
    }
}

/// One packaged output.
#[derive(Clone, Debug)]
pub struct BuiltArtifact {
    /// Platform the artifact was built for
    pub platform: Platform,

    /// Resolved artifact name
    pub name: ResolvedName,

    /// Final location in the output directory
    pub path: PathBuf,

    /// Size in bytes
    pub size: u64,

    /// SHA-256 checksum, lowercase hex
    pub checksum: String,
}

/// Pipeline orchestrator.
#[derive(Debug)]
pub struct Builder {
    settings: BuildSettings,
    phase: BuildPhase,
}

impl Builder {
    /// Create a builder. Nothing happens until [`Builder::run`].
    pub fn new(settings: BuildSettings) -> Self {
        Self {
            settings,
            phase: BuildPhase::Idle,
        }
    }

    /// The settings this builder runs.
    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Phase reached by the latest run.
    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    /// Build and package every platform.
    ///
    /// # Errors
    ///
    /// Configuration errors are returned before any process is spawned.
    /// Otherwise the first compiler, fusion or I/O failure is returned and
    /// the remaining platforms are skipped. The temp directory is removed in
    /// both cases.
    pub async fn run(&mut self) -> Result<Vec<BuiltArtifact>> {
        self.phase = BuildPhase::Preparing;
        let result = execute(&self.settings, &mut self.phase).await;
        self.phase = match &result {
            Ok(_) => BuildPhase::Done,
            Err(e) => {
                log::error!("Build failed during {}: {}", self.phase, e);
                BuildPhase::Failed
            }
        };
        result
    }
}

async fn execute(settings: &BuildSettings, phase: &mut BuildPhase) -> Result<Vec<BuiltArtifact>> {
    settings.validate()?;
    check_compiler(settings.compiler_program());

    log::info!(
        "Preparing build of {} platform(s) from {}",
        settings.platforms.len(),
        settings.source.display()
    );
    let ctx = RunContext::prepare(settings).await?;
    let toolchain = Toolchain::new(settings, ctx.source(), ctx.ldflags());
    let disambiguate = settings.platforms.len() > 1;

    let mut artifacts = Vec::with_capacity(settings.platforms.len());
    for (i, platform) in settings.platforms.iter().enumerate() {
        *phase = BuildPhase::PerPlatform(i);

        let output = ctx.artifact_path(i);
        let compiled = if platform.is_universal() {
            universal::build(&toolchain, platform, &ctx.universal_dir(i), &output).await?
        } else {
            toolchain.compile(platform, &output).await?
        };

        let name = resolve_name(ctx.skeleton(), platform, disambiguate);
        let packager = Packager::select(settings.compression, &name.os, settings.output_mode);
        let path = packager.package(&compiled, &name, ctx.output_dir()).await?;

        let size = tokio::fs::metadata(&path)
            .await
            .fs_context("reading artifact metadata", &path)?
            .len();
        let checksum = calculate_sha256(&path).await?;

        log::info!("Packaged {} ({} bytes)", path.display(), size);
        artifacts.push(BuiltArtifact {
            platform: platform.clone(),
            name,
            path,
            size,
            checksum,
        });
    }

    ctx.close();
    Ok(artifacts)
}

fn check_compiler(program: &str) {
    match which::which(program) {
        Ok(path) => log::debug!("Using compiler {}", path.display()),
        Err(e) => log::warn!("Compiler '{program}' not found in PATH: {e}"),
    }
}

/// SHA-256 of a file, lowercase hex.
async fn calculate_sha256(path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};
    use tokio::io::AsyncReadExt;

    let mut file = tokio::fs::File::open(path)
        .await
        .fs_context("opening artifact", path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading artifact", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
