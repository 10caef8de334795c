//! Loading documents: resolve, read, render, parse.
//!
//! Every document the builder touches goes through the same four steps:
//!
//! 1. resolve the reference against the declaring document's directory, falling back
//!    to the invoking directory
//! 2. read it as text
//! 3. render it as a Tera template
//! 4. parse the rendered text as YAML
//!
//! The file suffix plays no part: `.yml`, `.yaml` and `.j2` documents are all rendered.
//! Any failure is wrapped in [`BuildError::DocumentLoad`] naming the document.
//!
//! Documents rendered with the shared process context (the deployment and every
//! dataflow referenced by a dynamic node) are cached for the duration of one build,
//! keyed by resolved path. Component templates are rendered with their own variables
//! and never cached.

use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tera::Context as TeraContext;

use crate::core::{BuildError, BuildResult};
use crate::resolver::PathResolver;
use crate::templating::TemplateRenderer;

/// A rendered and parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    /// Absolute path of the document
    pub path: PathBuf,
    /// Parsed content; [`Value::Null`] for an empty document
    pub value: Value,
}

impl LoadedDocument {
    /// Directory the document lives in; the primary base for its references.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Loads documents for one build.
#[derive(Debug)]
pub struct DocumentLoader {
    paths: PathResolver,
    renderer: TemplateRenderer,
    cache: HashMap<PathBuf, Rc<LoadedDocument>>,
}

impl DocumentLoader {
    /// Create a loader with an empty cache.
    #[must_use]
    pub fn new(paths: PathResolver) -> Self {
        Self {
            paths,
            renderer: TemplateRenderer::new(),
            cache: HashMap::new(),
        }
    }

    /// The path resolver references are resolved with.
    #[must_use]
    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    /// Load `reference` declared by a document in `base_dir`, rendering it with
    /// `context`. Bypasses the cache.
    pub fn load(
        &self,
        reference: &Path,
        base_dir: &Path,
        context: &TeraContext,
    ) -> BuildResult<LoadedDocument> {
        let path = self.resolve(reference, base_dir)?;
        self.load_resolved(path, context)
    }

    /// Load `reference` rendered with the shared process context, reusing an earlier
    /// load of the same resolved path.
    pub fn load_shared(
        &mut self,
        reference: &Path,
        base_dir: &Path,
        context: &TeraContext,
    ) -> BuildResult<Rc<LoadedDocument>> {
        let path = self.resolve(reference, base_dir)?;

        if let Some(document) = self.cache.get(&path) {
            tracing::debug!("Reusing loaded document {}", path.display());
            return Ok(Rc::clone(document));
        }

        let document = Rc::new(self.load_resolved(path.clone(), context)?);
        self.cache.insert(path, Rc::clone(&document));
        Ok(document)
    }

    fn resolve(&self, reference: &Path, base_dir: &Path) -> BuildResult<PathBuf> {
        self.paths
            .resolve(reference, base_dir)
            .map_err(|e| BuildError::document_load(reference, e))
    }

    fn load_resolved(&self, path: PathBuf, context: &TeraContext) -> BuildResult<LoadedDocument> {
        tracing::debug!("Loading document {}", path.display());

        match self.read_and_render(&path, context) {
            Ok(value) => Ok(LoadedDocument {
                path,
                value,
            }),
            Err(e) => Err(BuildError::document_load(path, e)),
        }
    }

    fn read_and_render(&self, path: &Path, context: &TeraContext) -> BuildResult<Value> {
        let text = fs::read_to_string(path).map_err(|source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rendered = self.renderer.render_template(&text, context)?;
        parse_rendered(path, &rendered)
    }
}

/// Parse rendered text; a document with no content is [`Value::Null`].
fn parse_rendered(path: &Path, rendered: &str) -> BuildResult<Value> {
    let has_content = rendered.lines().map(str::trim).any(|line| {
        !line.is_empty() && !line.starts_with('#') && line != "---" && line != "..."
    });
    if !has_content {
        return Ok(Value::Null);
    }

    serde_yaml::from_str(rendered).map_err(|source| BuildError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
