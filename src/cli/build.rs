//! The `build` command.
//!
//! ```bash
//! dynamic-dora-builder build <DEPLOYMENT> [--export PATH] [--stdout]
//! ```
//!
//! - Without `--export` the dataflow is written to `dataflow.yml` in the current
//!   directory and also printed to stdout
//! - With `--export` it is only written, unless `--stdout` is given as well
//! - `DORA_BUILDER_EXPORT` supplies `--export` from the environment

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

use super::CliConfig;
use crate::builder::DataflowBuilder;
use crate::config::{DEFAULT_EXPORT_FILE, EXPORT_ENV_VAR};

/// Build a dataflow from a deployment document.
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Deployment document to build
    #[arg(value_parser = existing_file)]
    deployment: PathBuf,

    /// Where to write the dataflow [default: dataflow.yml]
    #[arg(long, env = EXPORT_ENV_VAR, value_parser = export_target)]
    export: Option<PathBuf>,

    /// Print the dataflow to stdout even when exporting to an explicit path
    #[arg(long)]
    stdout: bool,
}

impl BuildCommand {
    /// Build and export with the current process environment.
    pub fn execute(self, config: &CliConfig) -> Result<()> {
        let builder = DataflowBuilder::from_process()?;
        self.execute_with_builder(&builder, config)
    }

    /// Build and export with an explicit builder.
    pub fn execute_with_builder(self, builder: &DataflowBuilder, config: &CliConfig) -> Result<()> {
        let implicit_export = self.export.is_none();
        let export = self.export.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE));

        let dataflow = builder.build_and_export(&self.deployment, Some(&export))?;

        if self.stdout || implicit_export {
            print!("{}", dataflow.to_yaml()?);
        }

        if !config.quiet {
            eprintln!("{} {}", "Dataflow exported to".green(), export.display());
        }
        Ok(())
    }
}

fn existing_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_file() {
        Ok(path)
    } else if path.exists() {
        Err(format!("Deployment is not a file: {value}"))
    } else {
        Err(format!("Deployment file not found: {value}"))
    }
}

fn export_target(value: &str) -> Result<PathBuf, String> {
    if Path::new(value).is_dir() {
        Err("--export must point to a file, not a directory".to_string())
    } else {
        Ok(PathBuf::from(value))
    }
}
