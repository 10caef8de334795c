//! dynamic-dora-builder command-line entry point.

use anyhow::Result;
use clap::Parser;
use dynamic_dora_builder::cli;
use dynamic_dora_builder::core::user_friendly_error;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
