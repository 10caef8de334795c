//! Importing nodes from other dataflow documents.

use serde_yaml::Value;
use std::path::{Path, PathBuf};

use super::node_resolver::NodeResolver;
use super::Origin;
use crate::core::{BuildError, BuildResult};
use crate::dataflow::ResolvedNode;
use crate::deployment::node::{derived_id, raw_id};
use crate::deployment::{DynamicNode, NodeList};
use crate::utils::normalize_path_for_storage;

/// The `(document, node id)` pairs currently being resolved, outermost first.
#[derive(Debug, Default)]
pub(super) struct ReferenceChain {
    links: Vec<(PathBuf, String)>,
}

impl ReferenceChain {
    fn contains(&self, document: &Path, id: &str) -> bool {
        self.links.iter().any(|(path, node)| path == document && node == id)
    }

    fn describe(&self, resolver: &NodeResolver<'_>, last: (&Path, &str)) -> Vec<String> {
        self.links
            .iter()
            .map(|(path, id)| (path.as_path(), id.as_str()))
            .chain(std::iter::once(last))
            .map(|(path, id)| {
                let shown = resolver.loader.paths().normalize_for_output(path);
                format!("{}#{id}", normalize_path_for_storage(shown))
            })
            .collect()
    }
}

/// Find the entry a dynamic node imports.
///
/// Entries are matched on their `id` first. Only when no entry carries the id are bare
/// operators matched on their derived id.
pub(super) fn find_node<'v>(nodes: &'v [Value], id: &str) -> Option<(usize, &'v Value)> {
    nodes.iter().enumerate().find(|(_, entry)| raw_id(entry) == Some(id)).or_else(|| {
        nodes
            .iter()
            .enumerate()
            .find(|(_, entry)| derived_id(entry).as_deref() == Some(id))
    })
}

pub(super) fn resolve(
    resolver: &mut NodeResolver<'_>,
    node: &DynamicNode,
    origin: &Origin,
    chain: &mut ReferenceChain,
) -> BuildResult<ResolvedNode> {
    let document =
        resolver.loader.load_shared(Path::new(&node.path), &origin.base_dir, resolver.context)?;

    if chain.contains(&document.path, &node.id) {
        return Err(BuildError::CyclicReference {
            chain: chain.describe(resolver, (&document.path, &node.id)),
        });
    }

    let list = NodeList::from_document(&document)?;
    let Some((index, entry)) = find_node(&list.nodes, &node.id) else {
        return Err(BuildError::DynamicNodeNotFound {
            id: node.id.clone(),
            source_path: resolver.loader.paths().normalize_for_output(&document.path),
        });
    };

    tracing::debug!(
        "Importing node '{}' from {} (nodes[{index}])",
        node.id,
        document.path.display()
    );

    let shown = resolver.loader.paths().normalize_for_output(&document.path);
    let nested = Origin {
        label: format!("{}#{} nodes[{index}]", normalize_path_for_storage(shown), node.id),
        base_dir: document.base_dir().to_path_buf(),
    };

    chain.links.push((document.path.clone(), node.id.clone()));
    let resolved = resolver.resolve_entry(entry, &nested, chain);
    chain.links.pop();
    resolved
}
