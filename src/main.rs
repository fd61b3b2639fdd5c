//! Main entry point for the `kata-hook` CLI.

use kata_hook::cli;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            if !e.is_user_error() {
                eprintln!("Re-run with --verbose or RUST_LOG=debug for details.");
            }
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        },
    }
}
