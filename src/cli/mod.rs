//! Command-line interface for dynamic-dora-builder.
//!
//! # Available Commands
//!
//! - `build` - compose a deployment document into a single dataflow
//!
//! # Global Options
//!
//! - `--verbose` / `-v`: debug logging on stderr
//! - `--quiet` / `-q`: only errors on stderr
//!
//! Logging honours `RUST_LOG` when it is set; otherwise the level follows the flags
//! above and defaults to warnings.
//!
//! ```bash
//! # Build, write dataflow.yml and print it
//! dynamic-dora-builder build deployment.yml
//!
//! # Write elsewhere, print anyway
//! dynamic-dora-builder build deployment.yml --export out/dataflow.yml --stdout
//!
//! # Trace path resolution
//! dynamic-dora-builder --verbose build deployment.yml
//! ```

pub mod build;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Runtime configuration derived from the global flags.
///
/// Separating configuration from parsing lets tests execute commands without touching
/// the process-wide logger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Suppress informational output on stderr
    pub quiet: bool,
}

impl CliConfig {
    /// Install the stderr log subscriber.
    ///
    /// `RUST_LOG` takes precedence over [`CliConfig::log_level`]. Calling this more
    /// than once is harmless.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Compose dora deployments into a single dataflow.
#[derive(Parser, Debug)]
#[command(
    name = "dynamic-dora-builder",
    about = "Compose dora deployments, components and dynamic nodes into a single dataflow",
    version,
    long_about = "Renders a deployment document, expands its components, imports dynamic nodes from other dataflows and writes one self-contained dataflow with normalized paths."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a dataflow from a deployment document
    Build(build::BuildCommand),
}

impl Cli {
    /// Execute the parsed command with logging configured from the global flags.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(&config)
    }

    /// Derive the runtime configuration from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            quiet: self.quiet,
        }
    }

    /// Execute the parsed command with an explicit configuration.
    pub fn execute_with_config(self, config: &CliConfig) -> Result<()> {
        match self.command {
            Commands::Build(cmd) => cmd.execute(config),
        }
    }
}
