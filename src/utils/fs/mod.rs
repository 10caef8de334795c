//! File system utilities.
//!
//! - [`paths`] - lexical normalization and relative path computation
//! - [`atomic`] - atomic writes for exported documents

pub mod atomic;
pub mod paths;

pub use atomic::{atomic_write, safe_write};
pub use paths::{absolutize, normalize_path, relative_to};
