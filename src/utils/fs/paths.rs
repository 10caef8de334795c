//! Lexical path utilities.
//!
//! None of these functions touch the filesystem: they fold `.` and `..` components and
//! compute relative paths purely from the path text, which keeps output paths stable
//! across symlinked working directories.

use std::path::{Component, Path, PathBuf};

/// Normalizes a path by resolving `.` and `..` components.
///
/// The path keeps its absolute or relative nature. A `..` that would climb above the
/// start of a relative path is kept, so `../src/./lib.rs` stays `../src/lib.rs`.
///
/// ```rust
/// use dynamic_dora_builder::utils::fs::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize_path(Path::new("/foo/./bar/../baz")), PathBuf::from("/foo/baz"));
/// assert_eq!(normalize_path(Path::new("../src/./lib.rs")), PathBuf::from("../src/lib.rs"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Makes `path` absolute by joining it onto `base` when it is relative, then
/// normalizes the result.
#[must_use]
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

/// Computes `path` relative to `base`.
///
/// Both paths are normalized first. Components of `base` not shared with `path` become
/// `..` segments. A path equal to `base` yields `.`. When the two paths share no root
/// (different Windows drives), `path` is returned unchanged.
///
/// ```rust
/// use dynamic_dora_builder::utils::fs::relative_to;
/// use std::path::{Path, PathBuf};
///
/// let root = Path::new("/work/robot");
/// assert_eq!(relative_to(Path::new("/work/robot/nodes/cam.py"), root), PathBuf::from("nodes/cam.py"));
/// assert_eq!(relative_to(Path::new("/work/shared/op.py"), root), PathBuf::from("../shared/op.py"));
/// assert_eq!(relative_to(Path::new("/work/robot"), root), PathBuf::from("."));
/// ```
#[must_use]
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path = normalize_path(path);
    let base = normalize_path(base);

    if path.is_absolute() != base.is_absolute() {
        return path;
    }

    let path_components: Vec<Component<'_>> = path.components().collect();
    let base_components: Vec<Component<'_>> = base.components().collect();

    let common = path_components
        .iter()
        .zip(base_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    // Nothing in common beyond an absent root means different drives or roots
    let roots_differ = matches!(path_components.first(), Some(Component::Prefix(_)))
        && path_components.first() != base_components.first();
    if roots_differ {
        return path;
    }

    let mut relative = PathBuf::new();
    for _ in common..base_components.len() {
        relative.push("..");
    }
    for component in &path_components[common..] {
        relative.push(component.as_os_str());
    }

    if relative.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        relative
    }
}
