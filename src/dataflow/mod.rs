//! The resolved output graph.
//!
//! A [`Dataflow`] is the single artifact of a build. It serializes to:
//!
//! ```yaml
//! nodes:
//! - id: camera
//!   path: nodes
//!   operator:
//!     entry_point: nodes/camera.py
//!     inputs: {}
//!     outputs:
//!     - image
//! ```
//!
//! Keys keep their declaration order and optional fields are omitted when absent.
//! Paths are stored with `/` separators on every platform.

use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use serde_yaml::Mapping;
use std::path::{Path, PathBuf};

use crate::utils::{normalize_path_for_storage, relative_to, safe_write};

/// A fully resolved operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedOperator {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    /// Resolved entry point
    #[serde(serialize_with = "serialize_path")]
    pub entry_point: PathBuf,
    pub inputs: Mapping,
    pub outputs: Vec<String>,
}

/// A fully resolved node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedNode {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Resolved node directory
    #[serde(serialize_with = "serialize_path")]
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<Mapping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    pub operator: ResolvedOperator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Mapping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<String>>,
}

impl ResolvedNode {
    /// Rewrite both paths of the node relative to `root`.
    #[must_use]
    pub fn relative_to(mut self, root: &Path) -> Self {
        self.path = relative_to(&self.path, root);
        self.operator.entry_point = relative_to(&self.operator.entry_point, root);
        self
    }
}

/// The merged dataflow graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataflow {
    pub nodes: Vec<ResolvedNode>,
}

impl Dataflow {
    /// Rewrite every path relative to `root`.
    #[must_use]
    pub fn relative_to(self, root: &Path) -> Self {
        Self {
            nodes: self.nodes.into_iter().map(|node| node.relative_to(root)).collect(),
        }
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&ResolvedNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Node ids in output order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.id.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize dataflow")
    }

    /// Write the YAML form to `path`, creating parent directories. The file is replaced
    /// atomically.
    pub fn export(&self, path: &Path) -> Result<()> {
        let yaml = self.to_yaml()?;
        safe_write(path, &yaml)
            .with_context(|| format!("Failed to export dataflow to {}", path.display()))?;
        tracing::debug!("Wrote {} nodes to {}", self.len(), path.display());
        Ok(())
    }
}

fn serialize_path<P, S>(path: P, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    P: AsRef<Path>,
    S: Serializer,
{
    serializer.serialize_str(&normalize_path_for_storage(path))
}
