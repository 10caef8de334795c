//! Classification and resolution of individual node entries.

use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tera::Context as TeraContext;

use super::dynamic::{self, ReferenceChain};
use super::{Declaration, Origin};
use crate::core::{BuildError, BuildResult};
use crate::dataflow::{ResolvedNode, ResolvedOperator};
use crate::deployment::{BareOperator, ExplicitNode, NodeDeclaration, Operator};
use crate::document::DocumentLoader;

/// Resolves node entries into [`ResolvedNode`]s with absolute paths.
///
/// Dataflow documents referenced by dynamic nodes are rendered with `context`, the
/// shared process context, and loaded through the loader's cache.
pub struct NodeResolver<'a> {
    pub(super) loader: &'a mut DocumentLoader,
    pub(super) context: &'a TeraContext,
}

impl<'a> NodeResolver<'a> {
    pub fn new(loader: &'a mut DocumentLoader, context: &'a TeraContext) -> Self {
        Self {
            loader,
            context,
        }
    }

    /// Resolve one declaration.
    ///
    /// # Errors
    ///
    /// - [`BuildError::InvalidNodeDeclaration`] when the entry has none of the three shapes
    /// - [`BuildError::PathNotFound`] when a node path or entry point does not exist
    /// - [`BuildError::DynamicNodeNotFound`] and [`BuildError::CyclicReference`] for
    ///   dynamic nodes
    pub fn resolve(&mut self, declaration: &Declaration) -> BuildResult<ResolvedNode> {
        let mut chain = ReferenceChain::default();
        self.resolve_entry(&declaration.value, &declaration.origin, &mut chain)
    }

    pub(super) fn resolve_entry(
        &mut self,
        value: &Value,
        origin: &Origin,
        chain: &mut ReferenceChain,
    ) -> BuildResult<ResolvedNode> {
        let declaration =
            NodeDeclaration::classify(value).map_err(|reason| BuildError::InvalidNodeDeclaration {
                node: origin.label.clone(),
                reason,
            })?;

        match declaration {
            NodeDeclaration::Explicit(node) => self.resolve_explicit(node, &origin.base_dir),
            NodeDeclaration::Bare(operator) => self.resolve_bare(operator, &origin.base_dir),
            NodeDeclaration::Dynamic(node) => dynamic::resolve(self, &node, origin, chain),
        }
    }

    fn resolve_explicit(&self, node: ExplicitNode, base_dir: &Path) -> BuildResult<ResolvedNode> {
        let path = match &node.path {
            Some(path) => self.resolve_path(path, base_dir)?,
            None => base_dir.to_path_buf(),
        };
        let operator = self.resolve_operator(node.operator, base_dir)?;

        tracing::debug!("Resolved node '{}' at {}", node.id, path.display());
        Ok(ResolvedNode {
            id: node.id,
            name: node.name,
            path,
            env: node.env,
            build: node.build,
            operator,
            inputs: node.inputs,
            outputs: node.outputs,
        })
    }

    fn resolve_bare(&self, bare: BareOperator, base_dir: &Path) -> BuildResult<ResolvedNode> {
        let operator = self.resolve_operator(bare.operator, base_dir)?;

        tracing::debug!("Resolved bare operator '{}'", bare.id);
        Ok(ResolvedNode {
            id: bare.id,
            name: None,
            path: base_dir.to_path_buf(),
            env: bare.env,
            build: None,
            operator,
            inputs: None,
            outputs: None,
        })
    }

    fn resolve_operator(&self, operator: Operator, base_dir: &Path) -> BuildResult<ResolvedOperator> {
        let entry_point = self.resolve_path(&operator.entry_point, base_dir)?;
        Ok(ResolvedOperator {
            id: operator.id,
            name: operator.name,
            description: operator.description,
            build: operator.build,
            entry_point,
            inputs: operator.inputs,
            outputs: operator.outputs,
        })
    }

    fn resolve_path(&self, reference: &str, base_dir: &Path) -> BuildResult<PathBuf> {
        self.loader.paths().resolve(Path::new(reference), base_dir)
    }
}
