//! Render contexts for deployment documents and components.
//!
//! A deployment document sees exactly two variables:
//!
//! | Variable | Value |
//! |----------|-------|
//! | `env`    | the process environment captured in [`BuildContext`] |
//! | `cwd`    | the invoking directory as text |
//!
//! A component template sees only its own `env` mapping, both as top-level variables
//! (`{{ fps }}`) and under the `env` key (`{{ env.fps }}`). A top-level key named `env`
//! wins over the mapping itself. Components never see the process environment or each
//! other's variables.

use serde_yaml::Mapping;
use tera::Context as TeraContext;

use super::error::TemplateError;
use crate::config::BuildContext;

/// Build the context used to render deployment and referenced dataflow documents.
#[must_use]
pub fn deployment_context(build: &BuildContext) -> TeraContext {
    let mut context = TeraContext::new();
    context.insert("env", &build.env);
    context.insert("cwd", &build.cwd.to_string_lossy());
    context
}

/// Build the isolated context used to render one component template.
pub fn component_context(env: &Mapping) -> Result<TeraContext, TemplateError> {
    let value = serde_json::to_value(env).map_err(|e| TemplateError::InvalidContext {
        reason: e.to_string(),
    })?;

    let serde_json::Value::Object(variables) = value else {
        return Err(TemplateError::InvalidContext {
            reason: "component env must be a mapping".to_string(),
        });
    };

    let mut context = TeraContext::new();
    context.insert("env", &variables);
    for (key, value) in &variables {
        context.insert(key.as_str(), value);
    }
    Ok(context)
}

/// List the variables of a context in dotted form, two levels deep.
///
/// Used to suggest alternatives when a template references an undefined variable.
#[must_use]
pub fn available_variables(context: &TeraContext) -> Vec<String> {
    let mut variables = Vec::new();

    if let serde_json::Value::Object(map) = context.clone().into_json() {
        for (key, value) in &map {
            variables.push(key.clone());
            if let serde_json::Value::Object(nested) = value {
                variables.extend(nested.keys().map(|inner| format!("{key}.{inner}")));
            }
        }
    }

    variables.sort();
    variables
}
