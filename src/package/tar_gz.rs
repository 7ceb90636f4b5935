//! Single-entry tar+gzip archives.

use crate::error::{ErrorExt, Result};
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write `src` into a new gzip-compressed tar at `dest` as one entry named
/// `entry_name`, keeping the source file's mode and modification time.
pub(super) async fn write_archive(src: &Path, dest: &Path, entry_name: &str) -> Result<()> {
    let src = src.to_path_buf();
    let dest = dest.to_path_buf();
    let entry_name = entry_name.to_string();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut input = File::open(&src).fs_context("opening artifact", &src)?;
        let metadata = input
            .metadata()
            .fs_context("reading artifact metadata", &src)?;

        let output = File::create(&dest).fs_context("creating tar.gz archive", &dest)?;
        let enc = GzEncoder::new(output, flate2::Compression::default());
        let mut tar = tar::Builder::new(enc);

        let mut header = tar::Header::new_gnu();
        header.set_metadata(&metadata);
        tar.append_data(&mut header, &entry_name, &mut input)
            .fs_context("writing tar entry to", &dest)?;

        let enc = tar.into_inner().fs_context("finishing tar archive", &dest)?;
        let mut finished = enc.finish().fs_context("finishing gzip stream", &dest)?;
        finished.flush()?;
        finished.sync_all().fs_context("syncing tar.gz archive", &dest)?;
        Ok(())
    })
    .await?
}
