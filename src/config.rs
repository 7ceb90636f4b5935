//! Config file loading.
//!
//! A config file deserializes directly into [`BuildSettings`], plus one
//! optional key, `platform_shortcut`, naming a preset list (`common` or
//! `native`) that is appended to `platforms`.
//!
//! ```json
//! {
//!   "source": "./cmd/app",
//!   "output_name": "app-{Version}",
//!   "output_dir": "./dist",
//!   "compression": "auto",
//!   "version_symbol": "main.Version",
//!   "platform_shortcut": "common"
//! }
//! ```
//!
//! Relative paths are resolved against the config file's directory.

use crate::error::{ConfigError, ErrorExt, Result};
use crate::platform::Shortcut;
use crate::settings::BuildSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(flatten)]
    settings: BuildSettings,
    #[serde(default)]
    platform_shortcut: Option<String>,
}

/// Load settings from a `.json` or `.toml` file.
pub async fn load_settings(path: &Path) -> Result<BuildSettings> {
    let content = tokio::fs::read_to_string(path)
        .await
        .fs_context("reading config file", path)?;

    let mut settings = parse_settings(path, &content)?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    settings.source = relative_to(base, &settings.source);
    settings.output_dir = relative_to(base, &settings.output_dir);

    log::debug!(
        "Loaded {} platform(s) from {}",
        settings.platforms.len(),
        path.display()
    );
    Ok(settings)
}

/// Parse config text; the format is chosen from `path`'s extension.
pub fn parse_settings(path: &Path, content: &str) -> Result<BuildSettings> {
    let parse_error = |reason: String| ConfigError::Parse {
        path: path.to_path_buf(),
        reason,
    };

    let file: ConfigFile = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        Some("toml") => toml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        _ => {
            return Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }
            .into());
        }
    };

    let mut settings = file.settings;
    if let Some(keyword) = file.platform_shortcut.filter(|k| !k.trim().is_empty()) {
        let shortcut: Shortcut = keyword.parse()?;
        settings.platforms.extend(shortcut.platforms());
    }
    Ok(settings)
}

fn relative_to(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
