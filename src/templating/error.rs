//! Template error types.

use thiserror::Error;

use crate::core::BuildError;

/// Failures raised while building a context or rendering a template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template referenced a variable missing from its context.
    #[error("Template variable not found: '{variable}'")]
    VariableNotFound {
        /// Missing reference in dotted form
        variable: String,
        /// 1-based template line, when Tera reports one
        line: Option<usize>,
        /// Up to three similarly named variables from the context
        suggestions: Vec<String>,
    },

    /// Any other rendering or parsing failure.
    #[error("Template syntax error: {message}")]
    Syntax {
        /// Cleaned-up Tera message chain
        message: String,
        /// 1-based template line, when Tera reports one
        line: Option<usize>,
    },

    /// Variables could not be converted into a Tera context.
    #[error("Invalid template context: {reason}")]
    InvalidContext {
        /// Why the conversion failed
        reason: String,
    },
}

impl From<TemplateError> for BuildError {
    fn from(error: TemplateError) -> Self {
        match error {
            TemplateError::VariableNotFound {
                variable,
                line,
                suggestions,
            } => BuildError::UndefinedVariable {
                variable,
                line,
                suggestions,
            },
            TemplateError::Syntax {
                message,
                line,
            } => BuildError::TemplateSyntax {
                message,
                line,
            },
            TemplateError::InvalidContext {
                reason,
            } => BuildError::TemplateContext {
                reason,
            },
        }
    }
}
