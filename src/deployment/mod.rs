//! Typed model of deployment documents and node lists.
//!
//! A deployment is the root input of a build:
//!
//! ```yaml
//! nodes:
//!   - id: camera
//!     operator:
//!       python: camera.py
//!       outputs: [image]
//! components:
//!   - id: plots
//!     path: plots.yml.j2
//!     env: { count: 2 }
//! ```
//!
//! Node entries stay raw [`serde_yaml::Value`]s until the resolver classifies them with
//! [`NodeDeclaration::classify`], so one malformed entry is reported with its position
//! instead of failing the whole document.

pub mod component;
pub mod node;

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

pub use component::ComponentDeclaration;
pub use node::{BareOperator, DynamicNode, ExplicitNode, NodeDeclaration, Operator};

use crate::core::{BuildError, BuildResult};
use crate::document::LoadedDocument;

/// The root input document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Deployment {
    /// Directly declared node entries, in order
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<Value>,
    /// Component declarations, in order
    #[serde(default, deserialize_with = "null_as_default")]
    pub components: Vec<ComponentDeclaration>,
}

impl Deployment {
    /// Interpret a loaded document as a deployment. An empty document is an empty
    /// deployment.
    pub fn from_document(document: &LoadedDocument) -> BuildResult<Self> {
        from_document(document)
    }
}

/// Any document carrying a `nodes` list: a rendered component template or a dataflow
/// referenced by a dynamic node. Other top-level keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NodeList {
    /// Raw node entries, in order
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<Value>,
}

impl NodeList {
    /// Interpret a loaded document as a node list. An empty document has no nodes.
    pub fn from_document(document: &LoadedDocument) -> BuildResult<Self> {
        from_document(document)
    }
}

fn from_document<T>(document: &LoadedDocument) -> BuildResult<T>
where
    T: Default + serde::de::DeserializeOwned,
{
    if document.value.is_null() {
        return Ok(T::default());
    }
    serde_yaml::from_value(document.value.clone()).map_err(|source| BuildError::Parse {
        path: document.path.clone(),
        source,
    })
}

/// Deserialize an explicit `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
