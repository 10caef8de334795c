//! Template rendering engine with Tera.
//!
//! This module provides the [`TemplateRenderer`] that wraps Tera with strict
//! undefined-variable handling and structured error reporting.

use regex::Regex;
use std::sync::LazyLock;
use strsim::levenshtein;
use tera::{Context as TeraContext, Template, Tera};

use super::context::available_variables;
use super::error::TemplateError;
use super::strict::undefined_condition_variable;

/// Maximum allowed Levenshtein distance as a percentage of target length for suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Name Tera gives to templates rendered with `render_str`.
const ONE_OFF_TEMPLATE: &str = "__tera_one_off";

static VARIABLE_NOT_FOUND: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Variable `([^`]+)` not found").ok());
static UNKNOWN_VARIABLE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Unknown variable `([^`]+)`").ok());
static LINE_POSITION: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"--> (\d+):(\d+)").ok());

/// Renders document text against a variable context.
///
/// Rendering is a pure function of the source text and the context. Any reference to
/// a variable missing from the context fails with [`TemplateError::VariableNotFound`],
/// including references in `{% if %}` conditions; there is no silent empty-string or
/// `false` substitution. Authors opt in to fallbacks explicitly with Tera's `default`
/// filter:
///
/// ```yaml
/// path: {{ env.NODE_DIR | default(value="nodes") }}/camera.py
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    /// Create a new renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Render `template_content` with `context`.
    ///
    /// The template is parsed and its conditions checked against `context` before
    /// rendering. A fresh Tera instance is created per render, so no state leaks between
    /// documents. Autoescaping is disabled: output is YAML, not HTML.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::VariableNotFound`] when a variable is undefined
    /// - [`TemplateError::Syntax`] for malformed templates and unknown filters
    pub fn render_template(
        &self,
        template_content: &str,
        context: &TeraContext,
    ) -> Result<String, TemplateError> {
        let template = Template::new(ONE_OFF_TEMPLATE, None, template_content)
            .map_err(|e| Self::parse_tera_error(&e, context))?;
        if let Some(variable) = undefined_condition_variable(&template.ast, context) {
            let line = template_content
                .lines()
                .position(|line| line.contains(variable.as_str()))
                .map(|index| index + 1);
            return Err(Self::variable_not_found(variable, line, context));
        }

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        let rendered = tera
            .render_str(template_content, context)
            .map_err(|e| Self::parse_tera_error(&e, context))?;

        tracing::trace!("Rendered template ({} bytes)", rendered.len());
        Ok(rendered)
    }

    /// Parse a Tera error into a structured [`TemplateError`].
    ///
    /// Tera reports undefined variables as a plain message nested somewhere in the
    /// error chain ("Variable `foo` not found in context while rendering ..."), so the
    /// whole chain is searched.
    fn parse_tera_error(error: &tera::Error, context: &TeraContext) -> TemplateError {
        let line = Self::extract_line_from_tera_error(error);

        for message in Self::error_chain(error) {
            if let Some(variable) = Self::extract_variable_name(&message) {
                return Self::variable_not_found(variable, line, context);
            }
        }

        TemplateError::Syntax {
            message: Self::format_tera_error(error),
            line,
        }
    }

    fn variable_not_found(variable: String, line: Option<usize>, context: &TeraContext) -> TemplateError {
        let available = available_variables(context);
        let suggestions = Self::find_similar_variables(&variable, &available);
        TemplateError::VariableNotFound {
            variable,
            line,
            suggestions,
        }
    }

    fn error_chain(error: &tera::Error) -> Vec<String> {
        use std::error::Error;

        let mut messages = vec![error.to_string()];
        let mut current: Option<&dyn Error> = error.source();
        while let Some(err) = current {
            messages.push(err.to_string());
            current = err.source();
        }
        messages
    }

    /// Extract variable name from "Variable `foo` not found" message
    fn extract_variable_name(error_msg: &str) -> Option<String> {
        [&*VARIABLE_NOT_FOUND, &*UNKNOWN_VARIABLE].into_iter().flatten().find_map(|re| {
            re.captures(error_msg).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
        })
    }

    /// Find similar variable names using Levenshtein distance
    fn find_similar_variables(target: &str, available: &[String]) -> Vec<String> {
        let mut scored: Vec<_> =
            available.iter().map(|var| (var.clone(), levenshtein(target, var))).collect();

        scored.sort_by(|(a_var, a_dist), (b_var, b_dist)| a_dist.cmp(b_dist).then(a_var.cmp(b_var)));

        scored
            .into_iter()
            .filter(|(_, dist)| *dist > 0)
            .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
            .take(3)
            .map(|(var, _)| var)
            .collect()
    }

    /// Extract line number from Tera error message
    ///
    /// Tera parse errors carry `line:column` positions such as ` --> 3:7`.
    fn extract_line_from_tera_error(error: &tera::Error) -> Option<usize> {
        let re = (*LINE_POSITION).as_ref()?;
        Self::error_chain(error).iter().find_map(|msg| {
            re.captures(msg)
                .and_then(|caps| caps.get(1))
                .and_then(|line| line.as_str().parse::<usize>().ok())
        })
    }

    /// Format a Tera error chain into a single readable message.
    ///
    /// Filters out unhelpful references to Tera's internal one-off template name.
    pub fn format_tera_error(error: &tera::Error) -> String {
        let messages: Vec<String> = Self::error_chain(error)
            .into_iter()
            .map(|msg| {
                msg.replace(&format!("while rendering '{ONE_OFF_TEMPLATE}'"), "")
                    .replace(&format!("Failed to render '{ONE_OFF_TEMPLATE}'"), "")
                    .replace(&format!("Failed to parse '{ONE_OFF_TEMPLATE}'"), "")
                    .replace(&format!("'{ONE_OFF_TEMPLATE}'"), "template")
                    .trim()
                    .to_string()
            })
            .filter(|msg| !msg.is_empty())
            .collect();

        if messages.is_empty() {
            "Template rendering failed".to_string()
        } else {
            messages.join("\n  → ")
        }
    }
}
