//! Test utilities for dynamic-dora-builder
//!
//! Helpers shared by unit tests and the integration test target (through the
//! `test-utils` feature):
//!
//! - [`init_test_logging`] - route `tracing` output to the test writer
//! - [`TestEnvironment`] - a temporary project directory with a build context rooted
//!   in it, so tests never change the process working directory
//!
//! # Example
//!
//! ```rust,no_run
//! use dynamic_dora_builder::test_utils::TestEnvironment;
//!
//! let env = TestEnvironment::new().unwrap();
//! env.write("op.py", "").unwrap();
//! env.write("deploy.yml", "nodes:\n  - id: a\n    operator:\n      python: op.py\n").unwrap();
//!
//! let dataflow = env.builder().build(&env.path("deploy.yml")).unwrap();
//! assert_eq!(dataflow.ids().collect::<Vec<_>>(), vec!["a"]);
//! ```

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::builder::DataflowBuilder;
use crate::config::BuildContext;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise `RUST_LOG`;
/// with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=dynamic_dora_builder=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// A temporary project directory acting as the invoking directory of a build.
///
/// The directory is removed when the environment is dropped.
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub project_dir: PathBuf,
    env: BTreeMap<String, String>,
}

impl TestEnvironment {
    /// Create an empty project with an empty process environment.
    pub fn new() -> Result<Self> {
        init_test_logging(None);

        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        fs::create_dir_all(&project_dir)?;

        Ok(Self {
            temp_dir,
            project_dir,
            env: BTreeMap::new(),
        })
    }

    /// Add a variable to the environment templates see as `env`.
    #[must_use]
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Absolute path of `relative` inside the project.
    #[must_use]
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.project_dir.join(relative)
    }

    /// Absolute path of `relative` next to the project, outside the output root.
    #[must_use]
    pub fn outside(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    /// Write a file inside the project, creating parent directories.
    pub fn write(&self, relative: impl AsRef<Path>, content: &str) -> Result<PathBuf> {
        write_file(&self.path(relative), content)
    }

    /// Write a file next to the project, creating parent directories.
    pub fn write_outside(&self, relative: impl AsRef<Path>, content: &str) -> Result<PathBuf> {
        write_file(&self.outside(relative), content)
    }

    /// Whether `relative` exists inside the project.
    #[must_use]
    pub fn file_exists(&self, relative: impl AsRef<Path>) -> bool {
        self.path(relative).exists()
    }

    /// The build context: the project as working directory plus the configured vars.
    #[must_use]
    pub fn context(&self) -> BuildContext {
        BuildContext::new(&self.project_dir, self.env.clone())
    }

    /// A builder for [`TestEnvironment::context`].
    #[must_use]
    pub fn builder(&self) -> DataflowBuilder {
        DataflowBuilder::new(self.context())
    }
}

fn write_file(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path.to_path_buf())
}
