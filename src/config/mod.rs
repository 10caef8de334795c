//! Build configuration captured from the invoking process.
//!
//! The process environment and working directory are process-wide inputs. They are
//! read exactly once, when a build starts, into a [`BuildContext`] that is then passed
//! explicitly to every stage. Nothing downstream calls `std::env` on its own, which
//! keeps template rendering pure and lets tests supply any environment they like.
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - log filter, see [`crate::cli`]
//! - `DORA_BUILDER_EXPORT` - default for `build --export`

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the export file written when no `--export` path is given.
pub const DEFAULT_EXPORT_FILE: &str = "dataflow.yml";

/// Environment variable providing a default export path to the CLI.
pub const EXPORT_ENV_VAR: &str = "DORA_BUILDER_EXPORT";

/// Read-only snapshot of the process inputs a build depends on.
///
/// `cwd` doubles as the fallback base directory for relative references and as the
/// output root all emitted paths are made relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// The invoking directory (absolute)
    pub cwd: PathBuf,
    /// The process environment, sorted by name
    pub env: BTreeMap<String, String>,
}

impl BuildContext {
    /// Create a context from an explicit working directory and environment.
    pub fn new(cwd: impl Into<PathBuf>, env: BTreeMap<String, String>) -> Self {
        Self {
            cwd: cwd.into(),
            env,
        }
    }

    /// Capture the current process working directory and environment.
    ///
    /// Environment entries that are not valid UTF-8 are skipped.
    pub fn capture() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine the current directory")?;
        let env = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();

        tracing::debug!("Captured build context in {}", cwd.display());
        Ok(Self::new(cwd, env))
    }

    /// Replace the environment with the given variables.
    #[must_use]
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// The output root all emitted paths are relative to.
    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.cwd
    }

    /// Default export location inside the output root.
    #[must_use]
    pub fn default_export_path(&self) -> PathBuf {
        self.cwd.join(DEFAULT_EXPORT_FILE)
    }
}
