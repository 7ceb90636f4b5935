//! Command execution.

mod build;
mod platforms;

use crate::cli::{Args, Command, OutputManager};
use crate::error::{BuildError, Result};

use build::execute_build;
use platforms::execute_platforms;

/// Execute the command, returning the process exit code.
///
/// Command failures are printed with recovery suggestions and mapped to
/// exit code 1.
pub async fn execute_command(args: Args) -> Result<i32> {
    let output = OutputManager::new(args.verbose, args.quiet);

    let result = match &args.command {
        Command::Build(build) => execute_build(build, &output).await,
        Command::Platforms { shortcut } => execute_platforms(*shortcut, &output),
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            output.error(&format!("Command '{}' failed: {}", args.command.name(), e));
            print_suggestions(&e, &output);
            Ok(1)
        }
    }
}

/// Print recovery suggestions for `error`, if any.
pub fn print_suggestions(error: &BuildError, output: &OutputManager) {
    let suggestions = error.recovery_suggestions();
    if suggestions.is_empty() {
        return;
    }
    output.println("\n💡 Recovery suggestions:");
    for suggestion in suggestions {
        output.indent(&format!("• {suggestion}"));
    }
}
