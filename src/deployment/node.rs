//! Node declarations and their structural classification.
//!
//! A node list entry comes in one of three shapes:
//!
//! ```yaml
//! nodes:
//!   # explicit node: `id` + `operator`
//!   - id: camera
//!     path: nodes
//!     operator:
//!       python: camera.py
//!       outputs: [image]
//!   # bare operator: `operator` without `id`
//!   - operator:
//!       python: plot.py
//!       inputs:
//!         image: camera/image
//!   # dynamic node: imported by id from another dataflow
//!   - id: detector
//!     kind: dynamic
//!     path: ../vision/dataflow.yml
//! ```
//!
//! The shape is decided once by [`NodeDeclaration::classify`]; nothing downstream
//! inspects fields again.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::path::Path;

use super::null_as_default;

/// The only `kind` value a node declaration may carry.
pub const DYNAMIC_KIND: &str = "dynamic";

/// The runtime behavior of a node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Operator {
    /// Optional operator identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Human-readable name
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Build command
    #[serde(default)]
    pub build: Option<String>,
    /// Entry point, accepted under dora's `python` spelling as well
    #[serde(alias = "python")]
    pub entry_point: String,
    /// Input name to source (`node/output`, or dora's long form mapping), in
    /// declaration order
    #[serde(default, deserialize_with = "null_as_default")]
    pub inputs: Mapping,
    /// Output names, in declaration order
    #[serde(default, deserialize_with = "null_as_default")]
    pub outputs: Vec<String>,
}

impl Operator {
    /// Identifier a bare operator is known by: its own `id`, else the file stem of its
    /// entry point (`plot.py` is `plot`).
    #[must_use]
    pub fn derived_id(&self) -> Option<String> {
        if let Some(id) = &self.id {
            return Some(id.clone());
        }
        stem_of(&self.entry_point)
    }
}

fn stem_of(entry_point: &str) -> Option<String> {
    Path::new(entry_point)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty() && *stem != "..")
        .map(str::to_string)
}

/// A node with an identifier and an embedded operator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExplicitNode {
    /// Node identifier
    pub id: String,
    /// Node directory; the declaring document's directory when absent
    #[serde(default)]
    pub path: Option<String>,
    /// Human-readable name
    #[serde(default)]
    pub name: Option<String>,
    /// Build command
    #[serde(default)]
    pub build: Option<String>,
    /// Environment variables passed to the node at runtime
    #[serde(default)]
    pub env: Option<Mapping>,
    /// The node's operator
    pub operator: Operator,
    /// Node-level inputs, kept alongside the operator's
    #[serde(default)]
    pub inputs: Option<Mapping>,
    /// Node-level outputs
    #[serde(default)]
    pub outputs: Option<Vec<String>>,
}

/// An operator declared without a surrounding node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BareOperator {
    /// Identifier derived from the operator, see [`Operator::derived_id`]
    #[serde(skip)]
    pub id: String,
    /// The operator
    pub operator: Operator,
    /// Environment variables passed to the node at runtime
    #[serde(default)]
    pub env: Option<Mapping>,
}

/// A node whose definition is imported by id from another dataflow document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DynamicNode {
    /// Identifier of the node to import
    pub id: String,
    /// The dataflow document to import it from
    pub path: String,
}

/// One entry of a node list, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeDeclaration {
    /// `id` + `operator`
    Explicit(ExplicitNode),
    /// `operator` without `id`
    Bare(BareOperator),
    /// `kind: dynamic`
    Dynamic(DynamicNode),
}

impl NodeDeclaration {
    /// Classify a raw node list entry.
    ///
    /// # Errors
    ///
    /// Returns the reason the entry matches none of the three shapes, or why it failed
    /// to deserialize as the shape it matched.
    pub fn classify(value: &Value) -> Result<Self, String> {
        let Some(mapping) = value.as_mapping() else {
            return Err(format!("expected a mapping, found {}", describe_value(value)));
        };

        if let Some(kind) = mapping.get("kind") {
            return match kind.as_str() {
                Some(DYNAMIC_KIND) => from_value::<DynamicNode>(value).map(Self::Dynamic),
                _ => Err(format!(
                    "unsupported kind {}, only '{DYNAMIC_KIND}' is allowed",
                    describe_value(kind)
                )),
            };
        }

        if !mapping.contains_key("operator") {
            return Err(match mapping.get("id").and_then(Value::as_str) {
                Some(id) => format!("node '{id}' has no `operator` and is not `kind: {DYNAMIC_KIND}`"),
                None => format!("entry has neither `operator` nor `kind: {DYNAMIC_KIND}`"),
            });
        }

        if mapping.contains_key("id") {
            return from_value::<ExplicitNode>(value).map(Self::Explicit);
        }

        let mut bare = from_value::<BareOperator>(value)?;
        bare.id = bare.operator.derived_id().ok_or_else(|| {
            format!(
                "cannot derive an id for operator '{}', give it an `id`",
                bare.operator.entry_point
            )
        })?;
        Ok(Self::Bare(bare))
    }

    /// The identifier this declaration contributes to the dataflow.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Explicit(node) => &node.id,
            Self::Bare(operator) => &operator.id,
            Self::Dynamic(node) => &node.id,
        }
    }
}

/// The `id` field of a raw entry, if it has one.
#[must_use]
pub fn raw_id(value: &Value) -> Option<&str> {
    value.get("id").and_then(Value::as_str)
}

/// The derived identifier of a raw entry that has no `id` but an `operator`.
#[must_use]
pub fn derived_id(value: &Value) -> Option<String> {
    if raw_id(value).is_some() {
        return None;
    }
    let operator = value.get("operator")?;
    if let Some(id) = operator.get("id").and_then(Value::as_str) {
        return Some(id.to_string());
    }
    operator
        .get("entry_point")
        .or_else(|| operator.get("python"))
        .and_then(Value::as_str)
        .and_then(stem_of)
}

fn from_value<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, String> {
    serde_yaml::from_value(value.clone()).map_err(|e| e.to_string())
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("'{s}'"),
        Value::Sequence(_) => "a sequence".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        Value::Tagged(tagged) => format!("tagged value {}", tagged.tag),
    }
}
