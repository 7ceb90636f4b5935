//! Raw packaging: the binary itself is the artifact.

use crate::error::{ErrorExt, Result};
use std::path::Path;
use tokio::fs;

/// Move `src` to `dest` and apply `mode`.
///
/// A rename is attempted first. When that fails (typically because the temp
/// directory lives on another file system) the file is copied, synced to
/// disk, and the source removed. An interrupted copy is removed again.
pub(super) async fn move_into_place(src: &Path, dest: &Path, mode: u32) -> Result<()> {
    if let Err(e) = fs::rename(src, dest).await {
        log::debug!(
            "Rename {} -> {} failed ({}), copying instead",
            src.display(),
            dest.display(),
            e
        );
        copy_then_remove(src, dest).await?;
    }
    set_mode(dest, mode).await
}

async fn copy_then_remove(src: &Path, dest: &Path) -> Result<()> {
    let mut input = fs::File::open(src)
        .await
        .fs_context("opening artifact", src)?;

    if let Err(e) = copy_synced(&mut input, dest).await {
        super::remove_partial(dest).await;
        return Err(e);
    }
    drop(input);

    fs::remove_file(src)
        .await
        .fs_context("removing temporary artifact", src)
}

async fn copy_synced(input: &mut fs::File, dest: &Path) -> Result<()> {
    let mut output = fs::File::create(dest)
        .await
        .fs_context("copying artifact to", dest)?;
    tokio::io::copy(input, &mut output)
        .await
        .fs_context("copying artifact to", dest)?;
    output
        .sync_all()
        .await
        .fs_context("syncing copied artifact", dest)
}

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .await
        .fs_context("setting permissions on", path)
}

#[cfg(not(unix))]
async fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copy_fallback_removes_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a");
        let dest = dir.path().join("b");
        fs::write(&src, b"payload").await.unwrap();

        copy_then_remove(&src, &dest).await.unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dest).await.unwrap(), b"payload");
    }

    #[tokio::test]
    async fn missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = move_into_place(&dir.path().join("nope"), &dir.path().join("out"), 0o755)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("opening artifact"));
        assert!(!dir.path().join("out").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn interrupted_copy_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a");
        let dest = dir.path().join("b");
        fs::create_dir(&src).await.unwrap();

        copy_then_remove(&src, &dest).await.unwrap_err();

        assert!(src.exists());
        assert!(!dest.exists());
    }
}
