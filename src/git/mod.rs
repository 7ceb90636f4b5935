//! Version metadata from the source repository.
//!
//! Two independent, best-effort queries using gix (no git CLI):
//! the nearest tag (`git describe --tags`) and the HEAD commit hash
//! (`git rev-parse HEAD`). Either may be missing: no repository, no
//! commits, no tags. A missing value is never an error; it only means the
//! matching linker injection (and version placeholder) is skipped.

use gix::commit::describe::SelectRef;
use std::path::Path;

/// Version information discovered for one run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VersionInfo {
    /// Nearest tag, e.g. `v1.2.0` or `v1.2.0-3-gabc1234`
    pub tag: Option<String>,
    /// Full hex hash of HEAD
    pub hash: Option<String>,
}

impl VersionInfo {
    /// Query the repository containing `source`.
    pub fn discover(source: &Path) -> Self {
        let repo = match gix::discover(source) {
            Ok(repo) => repo,
            Err(e) => {
                log::warn!(
                    "No git repository at {}: {}; version metadata unavailable",
                    source.display(),
                    e
                );
                return Self::default();
            }
        };

        let info = Self {
            tag: describe_tags(&repo),
            hash: head_hash(&repo),
        };

        match (&info.tag, &info.hash) {
            (Some(tag), Some(hash)) => log::info!("Version {tag} ({hash})"),
            (None, Some(hash)) => log::warn!("No git tag found; building {hash} without version"),
            (_, None) => log::warn!("Could not resolve HEAD; building without version metadata"),
        }
        info
    }
}

fn describe_tags(repo: &gix::Repository) -> Option<String> {
    let commit = repo
        .head_commit()
        .map_err(|e| log::debug!("Cannot read HEAD commit: {e}"))
        .ok()?;
    let format = commit
        .describe()
        .names(SelectRef::AllTags)
        .try_format()
        .map_err(|e| log::debug!("git describe failed: {e}"))
        .ok()??;
    non_empty(format.to_string())
}

fn head_hash(repo: &gix::Repository) -> Option<String> {
    let id = repo
        .head_id()
        .map_err(|e| log::debug!("Cannot resolve HEAD: {e}"))
        .ok()?;
    non_empty(id.to_string())
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    /// Run the git CLI in `dir`, returning trimmed stdout.
    fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(["-c", "user.name=crossbuild", "-c", "user.email=crossbuild@example.com"])
            .args(["-c", "commit.gpgsign=false", "-c", "tag.gpgsign=false"])
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {args:?}: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }

    fn commit(dir: &Path, file: &str) {
        std::fs::write(dir.join(file), file).unwrap();
        git(dir, &["add", file]);
        git(dir, &["commit", "-q", "-m", file]);
    }

    #[test]
    fn tag_at_head_matches_git_describe() {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q"]);
        commit(dir.path(), "a");
        git(dir.path(), &["tag", "v1.0.0"]);

        let info = VersionInfo::discover(dir.path());
        assert_eq!(info.tag.as_deref(), Some("v1.0.0"));
        assert_eq!(info.hash, Some(git(dir.path(), &["rev-parse", "HEAD"])));
    }

    #[test]
    fn commit_past_tag_matches_git_describe() {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q"]);
        commit(dir.path(), "a");
        git(dir.path(), &["tag", "v1.0.0"]);
        commit(dir.path(), "b");

        let expected = git(dir.path(), &["describe", "--tags"]);
        assert!(expected.starts_with("v1.0.0-1-g"), "{expected}");

        let info = VersionInfo::discover(dir.path());
        assert_eq!(info.tag, Some(expected));
    }

    #[test]
    fn annotated_tag_matches_git_describe() {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q"]);
        commit(dir.path(), "a");
        git(dir.path(), &["tag", "-a", "v2.0.0", "-m", "release"]);

        let info = VersionInfo::discover(dir.path());
        assert_eq!(info.tag, Some(git(dir.path(), &["describe", "--tags"])));
        assert_eq!(info.tag.as_deref(), Some("v2.0.0"));
    }

    #[test]
    fn untagged_repository_has_hash_only() {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q"]);
        commit(dir.path(), "a");

        let info = VersionInfo::discover(dir.path());
        assert_eq!(info.tag, None);
        assert_eq!(info.hash, Some(git(dir.path(), &["rev-parse", "HEAD"])));
    }

    #[test]
    fn plain_directory_has_no_metadata() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(VersionInfo::discover(dir.path()), VersionInfo::default());
    }

    #[test]
    fn empty_values_are_absent() {
        assert_eq!(non_empty("  \n".to_string()), None);
        assert_eq!(non_empty(" v1.0.0\n".to_string()).as_deref(), Some("v1.0.0"));
    }
}
