//! The build pipeline.
//!
//! [`DataflowBuilder::build`] turns a deployment document into a [`Dataflow`]:
//!
//! 1. **Render** the deployment with `{env, cwd}` from the [`BuildContext`]
//! 2. **Expand** components in declaration order
//! 3. **Resolve** directly declared nodes, then component nodes; an id declared twice
//!    is an error
//! 4. **Normalize** every path relative to the output root
//! 5. **Assemble** the dataflow
//!
//! Any failure aborts the build; nothing is written for a failed build.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dynamic_dora_builder::builder::DataflowBuilder;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let builder = DataflowBuilder::from_process()?;
//! let dataflow = builder.build(Path::new("deployment.yml"))?;
//! println!("{}", dataflow.to_yaml()?);
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::config::BuildContext;
use crate::core::{BuildError, BuildResult};
use crate::dataflow::{Dataflow, ResolvedNode};
use crate::deployment::Deployment;
use crate::document::DocumentLoader;
use crate::resolver::{ComponentExpander, Declaration, NodeResolver, PathResolver};
use crate::templating::deployment_context;

/// Builds dataflows from deployment documents.
#[derive(Debug, Clone)]
pub struct DataflowBuilder {
    context: BuildContext,
}

impl DataflowBuilder {
    /// Create a builder for an explicit context.
    #[must_use]
    pub fn new(context: BuildContext) -> Self {
        Self {
            context,
        }
    }

    /// Create a builder for the current process environment and directory.
    pub fn from_process() -> Result<Self> {
        Ok(Self::new(BuildContext::capture()?))
    }

    /// The captured build context.
    #[must_use]
    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Build the dataflow described by `deployment`.
    ///
    /// A relative `deployment` path is taken from the context's working directory.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] encountered. Failures of individual nodes and
    /// components are wrapped in [`BuildError::NodeResolution`] and
    /// [`BuildError::ComponentExpansion`]; see [`BuildError::root_cause`].
    pub fn build(&self, deployment: &Path) -> BuildResult<Dataflow> {
        let cwd = self.context.cwd.as_path();
        let template_context = deployment_context(&self.context);
        let mut loader = DocumentLoader::new(PathResolver::new(cwd));

        tracing::info!("Building dataflow from {}", deployment.display());

        let document = loader.load_shared(deployment, cwd, &template_context)?;
        let parsed = Deployment::from_document(&document)?;
        let deployment_dir = document.base_dir().to_path_buf();
        tracing::debug!(
            "Deployment declares {} nodes and {} components",
            parsed.nodes.len(),
            parsed.components.len()
        );

        let mut declarations = Declaration::from_list("", parsed.nodes, &deployment_dir);
        declarations
            .extend(ComponentExpander::new(&loader).expand_all(&parsed.components, &deployment_dir)?);

        let nodes = resolve_all(&mut loader, &template_context, &declarations)?;

        let dataflow = Dataflow {
            nodes,
        }
        .relative_to(self.context.output_root());

        tracing::info!("Built dataflow with {} nodes", dataflow.len());
        Ok(dataflow)
    }

    /// Build the dataflow and write it to `export`.
    ///
    /// The file is only written once the build succeeded; parent directories are
    /// created and the previous file is replaced atomically. Without an explicit export
    /// path the dataflow goes to `dataflow.yml` in the working directory.
    pub fn build_and_export(&self, deployment: &Path, export: Option<&Path>) -> Result<Dataflow> {
        let dataflow = self
            .build(deployment)
            .with_context(|| format!("Failed to build dataflow from {}", deployment.display()))?;

        let target = match export {
            Some(path) if path.is_relative() => self.context.cwd.join(path),
            Some(path) => path.to_path_buf(),
            None => self.context.default_export_path(),
        };
        dataflow.export(&target)?;

        tracing::info!("Exported dataflow to {}", target.display());
        Ok(dataflow)
    }
}

/// Resolve declarations in order, rejecting duplicate ids.
fn resolve_all(
    loader: &mut DocumentLoader,
    template_context: &tera::Context,
    declarations: &[Declaration],
) -> BuildResult<Vec<ResolvedNode>> {
    let mut resolver = NodeResolver::new(loader, template_context);
    let mut first_seen: HashMap<String, &str> = HashMap::new();
    let mut nodes = Vec::with_capacity(declarations.len());

    for declaration in declarations {
        let label = declaration.origin.label.as_str();
        let node = resolver.resolve(declaration).map_err(|e| BuildError::node(label, e))?;

        if let Some(first) = first_seen.get(node.id.as_str()) {
            return Err(BuildError::DuplicateNodeId {
                id: node.id,
                first: (*first).to_string(),
                second: label.to_string(),
            });
        }

        first_seen.insert(node.id.clone(), label);
        nodes.push(node);
    }

    Ok(nodes)
}
