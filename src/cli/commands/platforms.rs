//! Platforms command implementation.

use crate::cli::OutputManager;
use crate::error::Result;
use crate::platform::Shortcut;

/// Print every platform of a preset, one per line.
pub(super) fn execute_platforms(shortcut: Shortcut, output: &OutputManager) -> Result<()> {
    output.section(&format!("{shortcut} platforms"));
    for platform in shortcut.platforms() {
        output.println(&platform.to_string());
    }
    Ok(())
}
