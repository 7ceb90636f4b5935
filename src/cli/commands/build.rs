//! Build command implementation.

use crate::builder::{Builder, BuiltArtifact};
use crate::cli::{BuildArgs, OutputManager};
use crate::error::Result;

/// Execute build command
pub(super) async fn execute_build(args: &BuildArgs, output: &OutputManager) -> Result<()> {
    let settings = args.settings().await?;

    output.verbose(&format!(
        "Source {}, output {}, compression {}",
        settings.source.display(),
        settings.output_dir.display(),
        settings.compression
    ));
    output.println(&format!(
        "🔨 Building {} platform(s)...",
        settings.platforms.len()
    ));
    for platform in &settings.platforms {
        output.verbose(&format!("  {platform}"));
    }

    let output_dir = settings.output_dir.clone();
    let artifacts = Builder::new(settings).run().await?;
    print_build_summary(&artifacts, output);
    output.info(&format!("Artifacts written to {}", output_dir.display()));
    Ok(())
}

fn print_build_summary(artifacts: &[BuiltArtifact], output: &OutputManager) {
    if artifacts.is_empty() {
        output.warn("No artifacts were created");
        return;
    }

    output.success(&format!("Created {} artifact(s)", artifacts.len()));

    for artifact in artifacts {
        output.println(&format!("\n  {}:", artifact.platform));
        let size_mb = artifact.size as f64 / 1_048_576.0;
        output.println(&format!(
            "    📦 {} ({:.2} MB)",
            artifact.path.display(),
            size_mb
        ));
        output.println(&format!("    🔐 SHA256: {}", artifact.checksum));
    }
}
