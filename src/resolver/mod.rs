//! Node resolution: from raw node list entries to [`ResolvedNode`]s.
//!
//! # Architecture
//!
//! - [`PathResolver`] resolves file references against a primary base directory with
//!   the invoking directory as fallback
//! - [`ComponentExpander`] renders component templates into additional node entries
//! - [`NodeResolver`] classifies each entry and resolves it, recursing into other
//!   dataflow documents for dynamic nodes
//!
//! Every entry travels with a [`Declaration`] origin: the label used in diagnostics and
//! the directory its relative references are resolved from.
//!
//! # Dynamic Nodes
//!
//! A dynamic node imports the node with the same id from another dataflow document.
//! The imported entry may itself be dynamic; the chain of `(document, id)` pairs being
//! resolved is tracked and revisiting a pair fails with
//! [`BuildError::CyclicReference`](crate::core::BuildError::CyclicReference).
//!
//! [`ResolvedNode`]: crate::dataflow::ResolvedNode

pub mod components;
mod dynamic;
pub mod node_resolver;
pub mod path_resolver;

use serde_yaml::Value;
use std::path::PathBuf;

pub use components::ComponentExpander;
pub use node_resolver::NodeResolver;
pub use path_resolver::PathResolver;

/// Where a node entry was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// Human-readable position, e.g. `nodes[2] (camera)` or `component 'plots' nodes[0]`
    pub label: String,
    /// Primary base directory for the entry's relative references
    pub base_dir: PathBuf,
}

impl Origin {
    /// Origin of entry `index` of a node list, labelled with `prefix`.
    pub fn entry(prefix: &str, index: usize, value: &Value, base_dir: impl Into<PathBuf>) -> Self {
        let position = if prefix.is_empty() {
            format!("nodes[{index}]")
        } else {
            format!("{prefix} nodes[{index}]")
        };
        let label = match crate::deployment::node::raw_id(value) {
            Some(id) => format!("{position} ({id})"),
            None => position,
        };

        Self {
            label,
            base_dir: base_dir.into(),
        }
    }
}

/// A raw node entry together with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub value: Value,
    pub origin: Origin,
}

impl Declaration {
    /// Wrap every entry of a node list, preserving order.
    pub fn from_list(prefix: &str, nodes: Vec<Value>, base_dir: &std::path::Path) -> Vec<Self> {
        nodes
            .into_iter()
            .enumerate()
            .map(|(index, value)| Self {
                origin: Origin::entry(prefix, index, &value, base_dir),
                value,
            })
            .collect()
    }
}
