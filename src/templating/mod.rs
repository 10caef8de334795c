//! Tera templating for deployment, dataflow and component documents.
//!
//! Every document the builder reads is a Tera template. It is rendered first and only
//! the rendered text is parsed as YAML, so template directives may generate any part of
//! the document, including whole node lists.
//!
//! # Template Context
//!
//! - Deployment documents and documents referenced by dynamic nodes see `env` (the
//!   process environment) and `cwd` (the invoking directory).
//! - Component templates see only their declared variables, see [`component_context`].
//!
//! # Strict Variables
//!
//! Undefined variables are errors, in conditions as much as in output: a deployment
//! gating nodes on `{% if env.ENABLE_CAMERA %}` fails when the variable is not set.
//! Use an `is defined` test or Tera's `default` filter to opt in to a fallback:
//!
//! ```yaml
//! nodes:
//!   - id: camera
//!     operator:
//!       python: {{ env.CAMERA_DIR | default(value="nodes") }}/camera.py
//! ```
//!
//! # Examples
//!
//! ```rust
//! use dynamic_dora_builder::templating::{TemplateRenderer, component_context};
//!
//! let env: serde_yaml::Mapping = serde_yaml::from_str("count: 2").unwrap();
//! let context = component_context(&env).unwrap();
//! let rendered = TemplateRenderer::new()
//!     .render_template("{% for i in range(end=count) %}n{{ i }} {% endfor %}", &context)
//!     .unwrap();
//! assert_eq!(rendered, "n0 n1 ");
//! ```

pub mod context;
pub mod error;
pub mod renderer;
mod strict;

pub use context::{available_variables, component_context, deployment_context};
pub use error::TemplateError;
pub use renderer::TemplateRenderer;
