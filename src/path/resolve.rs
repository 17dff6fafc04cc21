//! Relative path resolution for interactive navigation

use super::normalize::{SEPARATOR, VirtualPath, normalize};

/// Resolves `target` against `current`.
///
/// A leading `/` makes `target` absolute. `..` pops a segment (never above the
/// root) and `.` is ignored.
pub fn resolve(current: &VirtualPath, target: &str) -> VirtualPath {
    let target = target.trim();
    let mut segments: Vec<&str> = if target.starts_with(SEPARATOR) {
        Vec::new()
    } else {
        current.segments().collect()
    };

    for segment in target.split(SEPARATOR) {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    normalize(&segments.join("/"))
}

/// The directory containing `path`; the root is its own parent.
pub fn parent(path: &VirtualPath) -> VirtualPath {
    match path.as_str().rfind(SEPARATOR) {
        Some(idx) => normalize(&path.as_str()[..idx]),
        None => VirtualPath::root(),
    }
}
