//! Component declarations.

use serde::Deserialize;
use serde_yaml::Mapping;

use super::null_as_default;

/// A parametrized template that expands into additional node declarations.
///
/// ```yaml
/// components:
///   - id: cameras
///     path: templates/cameras.yml.j2
///     env:
///       count: 2
///       resolution: { width: 640, height: 480 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComponentDeclaration {
    /// Component identifier, used in diagnostics
    pub id: String,
    /// Template path, relative to the deployment document
    pub path: String,
    /// Variables visible to the template; values may be arbitrarily nested
    #[serde(default, deserialize_with = "null_as_default")]
    pub env: Mapping,
}
