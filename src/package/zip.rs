//! Single-entry zip archives.

use crate::error::{ErrorExt, Result};
use ::zip::write::SimpleFileOptions;
use ::zip::{CompressionMethod, ZipWriter};
use std::fs::{File, Metadata};
use std::path::Path;

/// Write `src` into a new zip at `dest` as one deflated entry named
/// `entry_name`, with timestamp and permissions taken from the source.
pub(super) async fn write_archive(src: &Path, dest: &Path, entry_name: &str) -> Result<()> {
    let src = src.to_path_buf();
    let dest = dest.to_path_buf();
    let entry_name = entry_name.to_string();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut input = File::open(&src).fs_context("opening artifact", &src)?;
        let metadata = input
            .metadata()
            .fs_context("reading artifact metadata", &src)?;

        let output = File::create(&dest).fs_context("creating zip archive", &dest)?;
        let mut zip = ZipWriter::new(output);

        zip.start_file(entry_name.as_str(), entry_options(&metadata))?;
        std::io::copy(&mut input, &mut zip).fs_context("writing zip entry to", &dest)?;

        let finished = zip.finish()?;
        finished.sync_all().fs_context("syncing zip archive", &dest)?;
        Ok(())
    })
    .await?
}

fn entry_options(metadata: &Metadata) -> SimpleFileOptions {
    let mut options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(metadata.len() >= u64::from(u32::MAX));

    if let Some(modified) = modified_time(metadata) {
        options = options.last_modified_time(modified);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options = options.unix_permissions(metadata.permissions().mode());
    }

    options
}

/// Zip timestamps are local time and cannot predate 1980.
fn modified_time(metadata: &Metadata) -> Option<::zip::DateTime> {
    let modified = metadata.modified().ok()?;
    let local = chrono::DateTime::<chrono::Local>::from(modified).naive_local();
    ::zip::DateTime::try_from(local).ok()
}
