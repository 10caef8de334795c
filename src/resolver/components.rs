//! Expansion of component templates into node entries.

use std::path::Path;

use super::Declaration;
use crate::core::{BuildError, BuildResult};
use crate::deployment::{ComponentDeclaration, NodeList};
use crate::document::DocumentLoader;
use crate::templating::component_context;

/// Renders component templates and collects the node entries they produce.
///
/// Each component is rendered with a fresh context built from its own `env` only.
/// Produced entries resolve their references against the deployment's directory, like
/// directly declared nodes.
pub struct ComponentExpander<'a> {
    loader: &'a DocumentLoader,
}

impl<'a> ComponentExpander<'a> {
    pub fn new(loader: &'a DocumentLoader) -> Self {
        Self {
            loader,
        }
    }

    /// Expand every component in declaration order.
    pub fn expand_all(
        &self,
        components: &[ComponentDeclaration],
        deployment_dir: &Path,
    ) -> BuildResult<Vec<Declaration>> {
        let mut declarations = Vec::new();
        for component in components {
            declarations.extend(self.expand(component, deployment_dir)?);
        }
        Ok(declarations)
    }

    /// Expand one component.
    ///
    /// # Errors
    ///
    /// Any failure is wrapped in [`BuildError::ComponentExpansion`] naming the component.
    pub fn expand(
        &self,
        component: &ComponentDeclaration,
        deployment_dir: &Path,
    ) -> BuildResult<Vec<Declaration>> {
        self.render_nodes(component, deployment_dir)
            .map_err(|e| BuildError::component(&component.id, e))
    }

    fn render_nodes(
        &self,
        component: &ComponentDeclaration,
        deployment_dir: &Path,
    ) -> BuildResult<Vec<Declaration>> {
        let context = component_context(&component.env)?;
        let document = self.loader.load(Path::new(&component.path), deployment_dir, &context)?;
        let list = NodeList::from_document(&document)?;

        if list.nodes.is_empty() {
            tracing::warn!("Component '{}' produced no nodes", component.id);
        } else {
            tracing::debug!("Component '{}' produced {} nodes", component.id, list.nodes.len());
        }

        let prefix = format!("component '{}'", component.id);
        Ok(Declaration::from_list(&prefix, list.nodes, deployment_dir))
    }
}
