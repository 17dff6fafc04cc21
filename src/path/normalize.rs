//! Path normalization operations

use log::warn;
use serde::Serialize;
use std::fmt;

use crate::error::PathError;

pub const SEPARATOR: char = '/';

/// A normalized location in the synthesized hierarchy.
///
/// Never begins or ends with `/`; the empty string is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VirtualPath(String);

impl VirtualPath {
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Wraps an object key or key prefix verbatim.
    ///
    /// Only surrounding separators are dropped; whitespace is part of the key.
    pub(crate) fn from_key(key: &str) -> Self {
        Self(key.trim_matches(SEPARATOR).to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.0.rsplit(SEPARATOR).next()
        }
    }

    /// Iterates the non-empty segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Prefix under which this directory's children are stored.
    ///
    /// Empty for the root, `path + "/"` otherwise.
    pub fn list_prefix(&self) -> String {
        if self.is_root() {
            String::new()
        } else {
            format!("{}{}", self.0, SEPARATOR)
        }
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VirtualPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strips every leading and trailing separator and whitespace character.
pub fn normalize(raw: &str) -> VirtualPath {
    VirtualPath(
        raw.trim_matches(|c: char| c == SEPARATOR || c.is_whitespace())
            .to_string(),
    )
}

/// Result of [`strip_container_prefix`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stripped {
    pub path: VirtualPath,
    /// Set when the container name was found and removed.
    pub stripped: bool,
}

/// Removes a redundant leading container name from `path`.
///
/// `"container/x"` becomes `"x"` and `"container"` becomes the root. A
/// stripped prefix is logged as a warning and flagged on the result.
pub fn strip_container_prefix(path: &VirtualPath, container: &str) -> Stripped {
    let container = container.trim().trim_matches(SEPARATOR);
    if container.is_empty() {
        return Stripped {
            path: path.clone(),
            stripped: false,
        };
    }

    let rest = if path.as_str() == container {
        Some("")
    } else {
        path.as_str()
            .strip_prefix(container)
            .and_then(|rest| rest.strip_prefix(SEPARATOR))
    };

    match rest {
        Some(rest) => {
            let resolved = normalize(rest);
            warn!(
                "Path '{}' repeats container name '{}'; using '{}'",
                path, container, resolved
            );
            Stripped {
                path: resolved,
                stripped: true,
            }
        }
        None => Stripped {
            path: path.clone(),
            stripped: false,
        },
    }
}

/// Appends a single leaf name to a directory path.
pub fn join(dir: &VirtualPath, leaf: &str) -> Result<VirtualPath, PathError> {
    if leaf.is_empty() || leaf.contains(SEPARATOR) {
        return Err(PathError::InvalidSegment(leaf.to_string()));
    }

    if dir.is_root() {
        Ok(VirtualPath(leaf.to_string()))
    } else {
        Ok(VirtualPath(format!("{}{}{}", dir.as_str(), SEPARATOR, leaf)))
    }
}

/// One navigable ancestor of a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub name: String,
    pub path: VirtualPath,
}

/// Splits a path into cumulative ancestors, outermost first.
pub fn breadcrumbs(path: &VirtualPath) -> Vec<Breadcrumb> {
    let mut crumbs = Vec::new();
    let mut current = String::new();

    for segment in path.segments() {
        if !current.is_empty() {
            current.push(SEPARATOR);
        }
        current.push_str(segment);
        crumbs.push(Breadcrumb {
            name: segment.to_string(),
            path: VirtualPath(current.clone()),
        });
    }

    crumbs
}
