//! Universal (fat) binaries for macOS.
//!
//! A `darwin/universal` platform is built twice, once for amd64 and once for
//! arm64, in an isolated work directory. The two binaries are then merged
//! with `lipo -create -output <out> <amd64> <arm64>`. Everything happens in
//! the run's temp directory, so a failure leaves nothing in the output
//! directory.

use super::Toolchain;
use crate::error::{ErrorExt, Result, ToolchainError};
use crate::platform::{Arch, Platform};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Real architectures fused into a universal binary, with the marker text
/// rewritten in compiler overrides and environment values for each.
const SLICES: [(Arch, &str, &str); 2] = [
    (Arch::AMD64, "arm64", "x86_64"),
    (Arch::ARM64, "x86_64", "arm64"),
];

/// Concrete sub-build descriptors for a universal platform.
pub fn slices(platform: &Platform) -> Vec<Platform> {
    SLICES
        .iter()
        .map(|(arch, from, to)| {
            let mut slice = platform.clone();
            slice.arch = Some(arch.clone());
            slice.arm = None;
            slice.cc = slice.cc.map(|cc| cc.replace(from, to));
            for value in slice.envs.values_mut() {
                *value = value.replace(from, to);
            }
            slice
        })
        .collect()
}

/// Build both slices in `work_dir` and fuse them into `output`.
pub async fn build(
    toolchain: &Toolchain<'_>,
    platform: &Platform,
    work_dir: &Path,
    output: &Path,
) -> Result<PathBuf> {
    platform.validate()?;

    tokio::fs::create_dir_all(work_dir)
        .await
        .fs_context("creating universal work directory", work_dir)?;

    let mut parts = Vec::with_capacity(SLICES.len());
    for (i, slice) in slices(platform).iter().enumerate() {
        let part = work_dir.join(format!("output-{i}"));
        parts.push(toolchain.compile(slice, &part).await?);
    }

    let tool = toolchain.settings().fusion_program();
    fuse(tool, output, &parts).await?;
    Ok(output.to_path_buf())
}

/// Run the fusion tool on `parts`.
///
/// On failure the error carries the tool's stdout followed by its stderr.
/// The two streams are captured separately, so their interleaving is not
/// preserved.
pub async fn fuse(tool: &str, output: &Path, parts: &[PathBuf]) -> Result<()> {
    log::info!(
        "Creating universal binary {} from {} slices",
        output.display(),
        parts.len()
    );

    let result = Command::new(tool)
        .arg("-create")
        .arg("-output")
        .arg(output)
        .args(parts)
        .output()
        .await
        .map_err(|source| ToolchainError::Spawn {
            program: tool.to_string(),
            source,
        })?;

    if !result.status.success() {
        let mut combined = String::from_utf8_lossy(&result.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&result.stderr));
        return Err(ToolchainError::FusionFailed {
            tool: tool.to_string(),
            status: result.status,
            output: combined,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BuildError, ConfigError};
    use crate::platform::Os;
    use crate::settings::BuildSettings;

    #[test]
    fn slices_swap_arch_markers() {
        let platform = Platform::new(Os::DARWIN, Arch::UNIVERSAL)
            .with_cc("o64-clang -arch arm64")
            .with_env("CGO_CFLAGS", "-arch x86_64");

        let slices = slices(&platform);
        assert_eq!(slices.len(), 2);

        assert_eq!(slices[0].target_arch(), Some(&Arch::AMD64));
        assert_eq!(slices[0].cc.as_deref(), Some("o64-clang -arch x86_64"));
        assert_eq!(slices[0].envs["CGO_CFLAGS"], "-arch x86_64");

        assert_eq!(slices[1].target_arch(), Some(&Arch::ARM64));
        assert_eq!(slices[1].cc.as_deref(), Some("o64-clang -arch arm64"));
        assert_eq!(slices[1].envs["CGO_CFLAGS"], "-arch arm64");
    }

    #[tokio::test]
    async fn rejects_other_operating_systems() {
        let settings = BuildSettings::default();
        let toolchain = Toolchain::new(&settings, Path::new("/src"), "");
        let work = tempfile::tempdir().unwrap();

        let err = build(
            &toolchain,
            &Platform::new(Os::WINDOWS, Arch::UNIVERSAL),
            &work.path().join("u"),
            &work.path().join("output-0"),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            BuildError::Config(ConfigError::UniversalUnsupported { ref os }) if os == "windows"
        ));
        assert!(!work.path().join("u").exists());
    }

    #[tokio::test]
    async fn missing_tool_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = fuse(
            "crossbuild-no-such-fusion-tool",
            &dir.path().join("out"),
            &[dir.path().join("a"), dir.path().join("b")],
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Toolchain(ToolchainError::Spawn { .. })
        ));
    }
}
