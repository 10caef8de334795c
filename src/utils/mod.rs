//! Cross-platform utilities used by the build pipeline.

pub mod fs;
pub mod platform;

pub use fs::{normalize_path, relative_to, safe_write};
pub use platform::normalize_path_for_storage;
