//! Runtime bundler - builds a relocatable runtime bundle for the host platform.
//!
//! Exit code 0 guarantees the archive exists and its digest was printed.

use runtime_bundler::{bundler::utils::scratch, cli};
use std::process;

#[tokio::main]
async fn main() {
    scratch::install_interrupt_cleanup();

    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            let output = cli::OutputManager::new(false);
            let _ = output.error(&e.to_string(), &e.recovery_suggestions());
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
