//! Shared fixtures: a source directory with a stub compiler.
//!
//! The compiler is `sh` running a `build` script from the source directory,
//! so `sh build -ldflags <flags> -o <out> ... <source>` behaves like
//! `go build`: it writes a small file to `<out>` and appends one line per
//! invocation to `invocations.log`.

#![allow(dead_code)]

use crossbuild::{BuildSettings, Platform};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const STUB_COMPILER: &str = r#"#!/bin/sh
ldflags="$2"
out="$4"
printf '%s|%s|%s|%s|%s|%s|%s|%s|%s\n' \
    "$GOOS" "$GOARCH" "$GOARM" "$CGO_ENABLED" "$CC" "$SHARED" \
    "${PATH:+inherited}" "$ldflags" "$out" >> invocations.log
if [ -n "$FAIL_ON" ] && [ "$GOOS/$GOARCH" = "$FAIL_ON" ]; then
    echo "compile error: $GOOS/$GOARCH"
    echo "stderr detail" >&2
    exit 2
fi
printf 'binary %s/%s%s\n' "$GOOS" "$GOARCH" "$GOARM" > "$out"
"#;

/// One recorded compiler invocation.
#[derive(Debug, Clone)]
pub struct Logged {
    pub os: String,
    pub arch: String,
    pub arm: String,
    pub cgo: String,
    pub cc: String,
    pub shared: String,
    pub inherited: bool,
    pub ldflags: String,
    pub output: PathBuf,
}

pub struct Fixture {
    pub root: TempDir,
    pub source: PathBuf,
    pub out: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let source = root.path().join("src");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("build"), STUB_COMPILER).unwrap();
        let out = root.path().join("dist");
        Self { root, source, out }
    }

    pub fn settings(&self, name: &str, platforms: Vec<Platform>) -> BuildSettings {
        BuildSettings {
            compiler: Some("sh".to_string()),
            source: self.source.clone(),
            output_dir: self.out.clone(),
            output_name: name.to_string(),
            platforms,
            ..Default::default()
        }
    }

    pub fn invocations(&self) -> Vec<Logged> {
        let Ok(log) = std::fs::read_to_string(self.source.join("invocations.log")) else {
            return Vec::new();
        };
        log.lines()
            .map(|line| {
                let f: Vec<&str> = line.split('|').collect();
                Logged {
                    os: f[0].to_string(),
                    arch: f[1].to_string(),
                    arm: f[2].to_string(),
                    cgo: f[3].to_string(),
                    cc: f[4].to_string(),
                    shared: f[5].to_string(),
                    inherited: f[6] == "inherited",
                    ldflags: f[7].to_string(),
                    output: PathBuf::from(f[8]),
                }
            })
            .collect()
    }

    pub fn output_files(&self) -> Vec<String> {
        list(&self.out)
    }
}

pub fn list(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Run the git CLI in `dir`, returning trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
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
