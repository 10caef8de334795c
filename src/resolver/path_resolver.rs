//! Resolution of relative file references and normalization for output.
//!
//! A reference written in a document is tried against two base directories:
//!
//! 1. the directory of the document that declared it (primary)
//! 2. the invoking directory (fallback)
//!
//! The first candidate that exists wins. An absolute reference is its own single
//! candidate, with `.` and `..` folded.
//! Everything is lexical: paths are never canonicalized, so symlinked working
//! directories produce stable output.

use std::path::{Path, PathBuf};

use crate::core::{BuildError, BuildResult};
use crate::utils::fs::{absolutize, relative_to};

/// Resolves references against a primary base directory with the invoking directory as
/// fallback, and rewrites resolved paths relative to the output root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    cwd: PathBuf,
}

impl PathResolver {
    /// Create a resolver whose fallback base and output root is `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
        }
    }

    /// The invoking directory.
    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Candidate locations for `reference`, in precedence order.
    ///
    /// Duplicates are removed, so a document living in the invoking directory yields a
    /// single candidate. An absolute reference is the only candidate; like every
    /// candidate it is lexically normalized, so `/a/./b/../c` is returned as `/a/c`.
    #[must_use]
    pub fn candidates(&self, reference: &Path, primary: &Path) -> Vec<PathBuf> {
        if reference.is_absolute() {
            return vec![absolutize(reference, &self.cwd)];
        }

        let primary = absolutize(primary, &self.cwd);
        let mut candidates = vec![absolutize(reference, &primary)];
        let fallback = absolutize(reference, &self.cwd);
        if !candidates.contains(&fallback) {
            candidates.push(fallback);
        }
        candidates
    }

    /// Resolve `reference` declared by a document living in `primary`.
    ///
    /// Returns an absolute, lexically normalized path.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::PathNotFound`] listing every candidate when none exists.
    pub fn resolve(&self, reference: &Path, primary: &Path) -> BuildResult<PathBuf> {
        if reference.as_os_str().is_empty() {
            return Err(BuildError::PathNotFound {
                reference: String::new(),
                searched: Vec::new(),
            });
        }

        let candidates = self.candidates(reference, primary);
        if let Some(found) = candidates.iter().find(|candidate| candidate.exists()) {
            tracing::trace!("Resolved '{}' to {}", reference.display(), found.display());
            return Ok(found.clone());
        }

        Err(BuildError::PathNotFound {
            reference: reference.display().to_string(),
            searched: candidates,
        })
    }

    /// Rewrite `path` relative to the output root.
    ///
    /// Paths outside the root get `..` segments and the root itself becomes `.`.
    #[must_use]
    pub fn normalize_for_output(&self, path: &Path) -> PathBuf {
        relative_to(&absolutize(path, &self.cwd), &self.cwd)
    }
}
