//! Platform helpers for the textual form of paths.
//!
//! Paths written into a dataflow document must read the same on every platform, so
//! they are stored with `/` separators regardless of the host.

use std::path::Path;

/// Normalizes a path for storage in a generated document.
///
/// Converts `\` separators to `/` and strips the Windows extended-length prefixes that
/// `canonicalize()` may introduce, so the same logical path always produces the same
/// string.
///
/// ```rust
/// use dynamic_dora_builder::utils::platform::normalize_path_for_storage;
/// use std::path::Path;
///
/// assert_eq!(normalize_path_for_storage(Path::new("nodes\\camera.py")), "nodes/camera.py");
/// assert_eq!(normalize_path_for_storage(Path::new("../shared/op.py")), "../shared/op.py");
/// ```
#[must_use]
pub fn normalize_path_for_storage<P: AsRef<Path>>(path: P) -> String {
    let path_str = path.as_ref().to_string_lossy();

    let cleaned = if let Some(stripped) = path_str.strip_prefix(r"\\?\UNC\") {
        format!("//{}", stripped)
    } else if let Some(stripped) = path_str.strip_prefix(r"\\?\") {
        stripped.to_string()
    } else {
        path_str.to_string()
    };

    cleaned.replace('\\', "/")
}
