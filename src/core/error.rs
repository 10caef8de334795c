//! Error handling for the dataflow builder
//!
//! This module provides the typed error taxonomy of the build pipeline and the
//! user-friendly presentation layer used by the CLI. The error system follows two
//! principles:
//! 1. **Strongly-typed errors** so callers and tests can match on the exact failure
//! 2. **User-friendly messages** that name the offending declaration and suggest a fix
//!
//! # Architecture
//!
//! - [`BuildError`] - every failure the build pipeline can produce
//! - [`ErrorContext`] - a rendered message with optional details and suggestion
//! - [`user_friendly_error`] - converts any [`anyhow::Error`] into an [`ErrorContext`]
//!
//! # Wrapping
//!
//! Lower-level failures never surface raw. A template or YAML failure is wrapped in
//! [`BuildError::DocumentLoad`], a failure while expanding a component is wrapped in
//! [`BuildError::ComponentExpansion`], and a failure while resolving a node is wrapped
//! in [`BuildError::NodeResolution`]. The underlying cause stays reachable through
//! [`std::error::Error::source`] and [`BuildError::root_cause`].
//!
//! ```rust,no_run
//! use dynamic_dora_builder::core::{BuildError, user_friendly_error};
//!
//! let error = BuildError::DynamicNodeNotFound {
//!     id: "plot".to_string(),
//!     source_path: "graphs/other.yml".into(),
//! };
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The error type of the build pipeline.
///
/// Variants map one-to-one onto the failure modes of a build. All of them are terminal:
/// the builder never retries and never produces partial output.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A referenced file exists in none of the candidate locations.
    #[error("Path '{reference}' not found (searched: {})", format_candidates(.searched))]
    PathNotFound {
        /// The reference exactly as written in the document
        reference: String,
        /// Every candidate that was checked, in precedence order
        searched: Vec<PathBuf>,
    },

    /// A template referenced a variable that is not part of its context.
    #[error("Undefined template variable '{variable}'{}", format_line(.line))]
    UndefinedVariable {
        /// The missing reference in dotted form (e.g. `env.HOME`)
        variable: String,
        /// Template line reported by Tera, when available
        line: Option<usize>,
        /// Similarly named variables that do exist in the context
        suggestions: Vec<String>,
    },

    /// Any template failure other than an undefined variable.
    #[error("Template error: {message}")]
    TemplateSyntax {
        /// Cleaned-up Tera error message
        message: String,
        /// Template line reported by Tera, when available
        line: Option<usize>,
    },

    /// Component variables could not be turned into a template context.
    #[error("Invalid template context: {reason}")]
    TemplateContext {
        /// Why the conversion failed
        reason: String,
    },

    /// A document could not be resolved, read, rendered or parsed.
    #[error("Failed to load document {}", .path.display())]
    DocumentLoad {
        /// The document path (resolved when resolution succeeded)
        path: PathBuf,
        /// The underlying failure
        #[source]
        cause: Box<BuildError>,
    },

    /// Reading a file failed.
    #[error("Failed to read {}", .path.display())]
    Io {
        /// The file that could not be read
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Rendered text is not valid YAML or does not have the expected shape.
    #[error("Invalid YAML in {}", .path.display())]
    Parse {
        /// The document that failed to parse
        path: PathBuf,
        /// The underlying parser error
        #[source]
        source: serde_yaml::Error,
    },

    /// A node list entry matches none of the supported declaration shapes.
    #[error("Invalid node declaration {node}: {reason}")]
    InvalidNodeDeclaration {
        /// Where the entry was declared (list position and origin)
        node: String,
        /// Why the entry was rejected
        reason: String,
    },

    /// A dynamic node names an identifier its referenced document does not contain.
    #[error("Dynamic node '{id}' not found in {}", .source_path.display())]
    DynamicNodeNotFound {
        /// The requested node identifier
        id: String,
        /// The referenced dataflow document
        source_path: PathBuf,
    },

    /// Dynamic references form a cycle.
    #[error("Cyclic dynamic node reference: {}", .chain.join(" -> "))]
    CyclicReference {
        /// The reference chain, ending with the repeated entry
        chain: Vec<String>,
    },

    /// Two resolved nodes share an identifier.
    #[error("Duplicate node id '{id}' declared by {first} and {second}")]
    DuplicateNodeId {
        /// The conflicting identifier
        id: String,
        /// Declaration that introduced the identifier first
        first: String,
        /// Declaration that repeated it
        second: String,
    },

    /// Expanding a component failed.
    #[error("Failed to expand component '{id}'")]
    ComponentExpansion {
        /// The component identifier
        id: String,
        /// The underlying failure
        #[source]
        cause: Box<BuildError>,
    },

    /// Resolving a node declaration failed.
    #[error("Failed to resolve node {node}")]
    NodeResolution {
        /// Where the node was declared
        node: String,
        /// The underlying failure
        #[source]
        cause: Box<BuildError>,
    },
}

impl BuildError {
    /// Wrap `cause` as a failure to load the document at `path`.
    pub fn document_load(path: impl Into<PathBuf>, cause: BuildError) -> Self {
        Self::DocumentLoad {
            path: path.into(),
            cause: Box::new(cause),
        }
    }

    /// Wrap `cause` as a failure to expand the component `id`.
    pub fn component(id: impl Into<String>, cause: BuildError) -> Self {
        Self::ComponentExpansion {
            id: id.into(),
            cause: Box::new(cause),
        }
    }

    /// Wrap `cause` as a failure to resolve the node declared at `node`.
    pub fn node(node: impl Into<String>, cause: BuildError) -> Self {
        Self::NodeResolution {
            node: node.into(),
            cause: Box::new(cause),
        }
    }

    /// Returns the innermost build error, skipping the wrapping variants.
    ///
    /// ```rust
    /// use dynamic_dora_builder::core::BuildError;
    ///
    /// let error = BuildError::component(
    ///     "camera",
    ///     BuildError::document_load(
    ///         "camera.yml.j2",
    ///         BuildError::UndefinedVariable {
    ///             variable: "fps".to_string(),
    ///             line: Some(3),
    ///             suggestions: vec![],
    ///         },
    ///     ),
    /// );
    /// assert!(matches!(error.root_cause(), BuildError::UndefinedVariable { .. }));
    /// ```
    #[must_use]
    pub fn root_cause(&self) -> &BuildError {
        match self {
            Self::DocumentLoad {
                cause,
                ..
            }
            | Self::ComponentExpansion {
                cause,
                ..
            }
            | Self::NodeResolution {
                cause,
                ..
            } => cause.root_cause(),
            other => other,
        }
    }
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    candidates.iter().map(|path| path.display().to_string()).collect::<Vec<_>>().join(", ")
}

fn format_line(line: &Option<usize>) -> String {
    line.map(|line| format!(" at line {line}")).unwrap_or_default()
}

/// User-facing presentation of an error.
///
/// When displayed, errors show:
/// 1. **error**: the main message in red
/// 2. **details**: the cause chain in yellow (optional)
/// 3. **suggestion**: an actionable fix in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The top-level error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context carrying only the error message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// [`BuildError`]s anywhere in the chain get a suggestion tailored to their root cause;
/// everything else is shown with its cause chain only.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let mut context = ErrorContext::new(error.to_string());

    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        let mut details = String::from("Caused by:");
        for (i, cause) in chain.iter().enumerate() {
            details.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
        context = context.with_details(details);
    }

    let build_error = error.chain().find_map(|cause| cause.downcast_ref::<BuildError>());
    if let Some(build_error) = build_error {
        if let Some(suggestion) = suggestion_for(build_error.root_cause()) {
            context = context.with_suggestion(suggestion);
        }
        return context;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            context = context.with_suggestion("Check file permissions and ownership");
        }
    }

    context
}

fn suggestion_for(error: &BuildError) -> Option<String> {
    let suggestion = match error {
        BuildError::PathNotFound {
            ..
        } => "Paths are resolved against the declaring document's directory first, then the current directory. Check the spelling or run the build from the directory the path is relative to".to_string(),
        BuildError::UndefinedVariable {
            variable,
            suggestions,
            ..
        } => {
            if suggestions.is_empty() {
                format!(
                    "Define '{variable}' or give it a fallback with {{{{ {variable} | default(value=\"...\") }}}}"
                )
            } else {
                format!("Did you mean one of: {}?", suggestions.join(", "))
            }
        }
        BuildError::TemplateSyntax {
            ..
        } => "Check template syntax: variables use {{ var }}, comments use {# #}, control flow uses {% %}".to_string(),
        BuildError::TemplateContext {
            ..
        } => "Component env values must be representable as JSON (string keys, no YAML tags)".to_string(),
        BuildError::Parse {
            ..
        } => "Check the YAML syntax of the rendered document: indentation, quoting and list markers".to_string(),
        BuildError::InvalidNodeDeclaration {
            ..
        } => "Each node needs an `operator` block (with or without `id`), or `id`, `path` and `kind: dynamic`".to_string(),
        BuildError::DynamicNodeNotFound {
            source_path,
            ..
        } => format!("Check that an entry with this id exists in the `nodes` list of {}", source_path.display()),
        BuildError::CyclicReference {
            ..
        } => "Make one of the documents in the chain declare the node inline instead of importing it".to_string(),
        BuildError::DuplicateNodeId {
            ..
        } => "Node ids must be unique across declared nodes, component nodes and imported nodes. Rename one of them".to_string(),
        _ => return None,
    };
    Some(suggestion)
}
