//! Lexical path normalization.

use std::path::{Component, Path, PathBuf};

/// Normalize a path without touching the filesystem.
///
/// Drops `.` segments, folds `name/..` pairs and rebuilds the path with the
/// platform separator. Leading `..` segments of a relative path are kept;
/// `..` directly under the root is dropped. An empty result becomes `.`.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    // Normal components that a later `..` may cancel.
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    out.pop();
                    depth -= 1;
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(name) => {
                out.push(name);
                depth += 1;
            }
        }
    }

    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
