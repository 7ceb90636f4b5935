//! Per-run state.
//!
//! Everything a run derives from its [`BuildSettings`] lives here, never on
//! the settings: absolute paths, the private temp directory, the linker
//! flags and the output name skeleton. The temp directory is removed when
//! the context is dropped, on every exit path.

use crate::error::{BuildError, ConfigError, ErrorExt, Result};
use crate::git::VersionInfo;
use crate::naming::Placeholder;
use crate::settings::BuildSettings;
use crate::toolchain;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TEMP_PREFIX: &str = "crossbuild-";

/// Derived state of one build run.
#[derive(Debug)]
pub struct RunContext {
    temp: TempDir,
    source: PathBuf,
    output_dir: PathBuf,
    ldflags: String,
    skeleton: String,
    version: VersionInfo,
}

impl RunContext {
    /// Prepare a run: resolve paths, clean and create the output
    /// directory, create the temp directory and query version metadata.
    pub async fn prepare(settings: &BuildSettings) -> Result<Self> {
        let source = resolve(&settings.source).await?;

        if settings.clean_output {
            clean(&settings.output_dir).await?;
        }
        tokio::fs::create_dir_all(&settings.output_dir)
            .await
            .fs_context("creating output directory", &settings.output_dir)?;
        let output_dir = resolve(&settings.output_dir).await?;

        let temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir()
            .fs_context("creating temp directory", std::env::temp_dir())?;
        log::debug!("Temp directory {}", temp.path().display());

        let version = {
            let source = source.clone();
            tokio::task::spawn_blocking(move || VersionInfo::discover(&source)).await?
        };

        let ldflags = toolchain::linker_flags(settings, &version);
        let skeleton = match &version.tag {
            Some(tag) => Placeholder::Version.substitute(&settings.output_name, tag),
            None => settings.output_name.clone(),
        };

        Ok(Self {
            temp,
            source,
            output_dir,
            ldflags,
            skeleton,
            version,
        })
    }

    /// Absolute source directory.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Absolute output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Private temp directory of this run.
    pub fn temp_dir(&self) -> &Path {
        self.temp.path()
    }

    /// Linker flags passed to every compiler invocation.
    pub fn ldflags(&self) -> &str {
        &self.ldflags
    }

    /// Output name template with the version token handled.
    pub fn skeleton(&self) -> &str {
        &self.skeleton
    }

    /// Version metadata found for the source.
    pub fn version(&self) -> &VersionInfo {
        &self.version
    }

    /// Temp location of platform `index`'s compiled binary.
    pub fn artifact_path(&self, index: usize) -> PathBuf {
        self.temp.path().join(format!("output-{index}"))
    }

    /// Work directory for platform `index`'s universal sub-builds.
    pub fn universal_dir(&self, index: usize) -> PathBuf {
        self.temp.path().join(format!("universal-{index}"))
    }

    /// Remove the temp directory now, logging instead of failing.
    pub fn close(self) {
        let path = self.temp.path().to_path_buf();
        match self.temp.close() {
            Ok(()) => log::debug!("Removed temp directory {}", path.display()),
            Err(e) => log::warn!("Failed to remove temp directory {}: {}", path.display(), e),
        }
    }
}

async fn resolve(path: &Path) -> Result<PathBuf> {
    let resolved =
        tokio::fs::canonicalize(path)
            .await
            .map_err(|source| ConfigError::UnresolvablePath {
                path: path.to_path_buf(),
                source,
            })?;
    Ok(resolved)
}

async fn clean(dir: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {
            log::info!("Cleaned {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(BuildError::Fs {
            context: "cleaning output directory",
            path: dir.to_path_buf(),
            error,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(source: &Path, out: &Path, name: &str) -> BuildSettings {
        BuildSettings {
            source: source.to_path_buf(),
            output_dir: out.to_path_buf(),
            output_name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn prepare_without_vcs_keeps_version_token() {
        let src = tempfile::tempdir().unwrap();
        let out = src.path().join("dist");
        let mut settings = settings(src.path(), &out, "app-{Version}");
        settings.version_symbol = Some("main.Version".to_string());

        let ctx = RunContext::prepare(&settings).await.unwrap();
        assert_eq!(ctx.skeleton(), "app-{Version}");
        assert_eq!(ctx.ldflags(), "");
        assert_eq!(ctx.version(), &VersionInfo::default());
        assert!(ctx.output_dir().is_absolute());
        assert!(out.is_dir());

        let temp = ctx.temp_dir().to_path_buf();
        assert!(temp.is_dir());
        assert_eq!(ctx.artifact_path(3), temp.join("output-3"));
        ctx.close();
        assert!(!temp.exists());
    }

    #[tokio::test]
    async fn dropping_context_removes_temp() {
        let src = tempfile::tempdir().unwrap();
        let settings = settings(src.path(), &src.path().join("dist"), "app");
        let ctx = RunContext::prepare(&settings).await.unwrap();
        let temp = ctx.temp_dir().to_path_buf();
        drop(ctx);
        assert!(!temp.exists());
    }

    #[tokio::test]
    async fn clean_output_removes_previous_artifacts() {
        let src = tempfile::tempdir().unwrap();
        let out = src.path().join("dist");
        tokio::fs::create_dir_all(&out).await.unwrap();
        tokio::fs::write(out.join("stale"), b"old").await.unwrap();

        let mut settings = settings(src.path(), &out, "app");
        settings.clean_output = true;
        let _ctx = RunContext::prepare(&settings).await.unwrap();

        assert!(out.is_dir());
        assert!(!out.join("stale").exists());
    }

    #[tokio::test]
    async fn missing_source_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&dir.path().join("nope"), &dir.path().join("dist"), "app");
        let err = RunContext::prepare(&settings).await.unwrap_err();
        assert!(matches!(
            err,
            BuildError::Config(ConfigError::UnresolvablePath { .. })
        ));
        assert!(!dir.path().join("dist").exists());
    }
}
