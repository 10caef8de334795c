//! Core types shared by every stage of the build pipeline.
//!
//! - [`error`] - the [`BuildError`] taxonomy and user-facing [`ErrorContext`]

pub mod error;

pub use error::{BuildError, ErrorContext, user_friendly_error};

/// Result alias used throughout the build pipeline.
pub type BuildResult<T> = std::result::Result<T, BuildError>;
