//! Packaging of compiled binaries.
//!
//! [`Compression`] is the policy from the settings; [`Packager`] is the
//! concrete strategy it resolves to for one platform. The strategy set is
//! closed: raw move, tar+gzip, or zip.
//!
//! | Policy | Output |
//! |--------|--------|
//! | raw (default, or anything unrecognised) | `<out>/<binary>` |
//! | tar.gz | `<out>/<name>.tar.gz` with one entry `<binary>` |
//! | zip | `<out>/<name>.zip` with one entry `<binary>` |
//! | auto | zip for Windows, tar.gz otherwise |

mod raw;
mod tar_gz;
mod zip;

use crate::error::Result;
use crate::naming::ResolvedName;
use crate::platform::Os;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Compression policy for all artifacts of a run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Compression {
    /// Move the binary into the output directory as is
    #[default]
    Raw,
    /// gzip-compressed tar archive
    TarGz,
    /// Deflate-compressed zip archive
    Zip,
    /// Zip for Windows targets, tar.gz for everything else
    Auto,
}

impl Compression {
    /// Keyword used in config files and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Compression::Raw => "raw",
            Compression::TarGz => "tar.gz",
            Compression::Zip => "zip",
            Compression::Auto => "auto",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Compression {
    type Err = Infallible;

    /// Unknown keywords behave like raw.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "tar.gz" | "targz" | "tgz" => Compression::TarGz,
            "zip" => Compression::Zip,
            "auto" => Compression::Auto,
            "raw" => Compression::Raw,
            other => {
                log::debug!("Unknown compression '{other}', using raw");
                Compression::Raw
            }
        })
    }
}

impl Serialize for Compression {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Compression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let Ok(compression) = text.parse();
        Ok(compression)
    }
}

/// Candidate output locations for one artifact.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputPaths {
    /// Uncompressed binary
    pub raw: PathBuf,
    /// tar+gzip archive
    pub tar_gz: PathBuf,
    /// zip archive
    pub zip: PathBuf,
}

impl OutputPaths {
    /// Compute all candidates inside `out_dir`.
    pub fn new(out_dir: &Path, name: &ResolvedName) -> Self {
        Self {
            raw: out_dir.join(&name.binary),
            tar_gz: out_dir.join(format!("{}.tar.gz", name.name)),
            zip: out_dir.join(format!("{}.zip", name.name)),
        }
    }
}

/// Concrete packaging strategy for one artifact.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Packager {
    /// Move (or copy) into place and fix permissions
    Raw {
        /// Unix mode applied to the output
        mode: u32,
    },
    /// Single-entry tar.gz
    TarGz,
    /// Single-entry zip
    Zip,
}

impl Packager {
    /// Resolve the policy for an artifact built for `os`.
    pub fn select(compression: Compression, os: &Os, mode: u32) -> Self {
        match compression {
            Compression::Raw => Packager::Raw { mode },
            Compression::TarGz => Packager::TarGz,
            Compression::Zip => Packager::Zip,
            Compression::Auto if os.is_windows() => Packager::Zip,
            Compression::Auto => Packager::TarGz,
        }
    }

    /// Package `artifact` into `out_dir`, returning the created file.
    ///
    /// The artifact is fully read and closed before this returns. If an
    /// archive write fails partway, the partial archive is removed before
    /// the error is returned. The raw strategy only cleans up an interrupted
    /// copy; a binary already moved into place is kept.
    pub async fn package(
        &self,
        artifact: &Path,
        name: &ResolvedName,
        out_dir: &Path,
    ) -> Result<PathBuf> {
        let paths = OutputPaths::new(out_dir, name);
        let dest = match self {
            Packager::Raw { .. } => paths.raw,
            Packager::TarGz => paths.tar_gz,
            Packager::Zip => paths.zip,
        };

        log::debug!("Packaging {} as {}", artifact.display(), dest.display());

        let result = match self {
            Packager::Raw { mode } => raw::move_into_place(artifact, &dest, *mode).await,
            Packager::TarGz => tar_gz::write_archive(artifact, &dest, &name.binary).await,
            Packager::Zip => zip::write_archive(artifact, &dest, &name.binary).await,
        };

        match result {
            Ok(()) => Ok(dest),
            Err(e) if self.is_archive() => {
                remove_partial(&dest).await;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// True for the strategies that write a new archive file.
    pub fn is_archive(&self) -> bool {
        matches!(self, Packager::TarGz | Packager::Zip)
    }
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => log::warn!("Removed partial output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove partial output {}: {}", path.display(), e),
    }
}
