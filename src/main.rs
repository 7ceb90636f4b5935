//! crossbuild - cross-compile a Go program for many platforms and package
//! the results.

use crossbuild::cli;
use crossbuild::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Never quiet for fatal errors
            let output = OutputManager::new(false, false);
            output.error(&format!("Fatal error: {e}"));
            cli::commands::print_suggestions(&e, &output);
            process::exit(1);
        }
    }
}
