//! Listing order
//!
//! Directories always come first; the requested key and direction only order
//! entries within each kind.

use serde::Deserialize;
use std::cmp::Ordering;
use std::str::FromStr;

use crate::listing::entry::{Entry, EntryKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Size,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// A sort key paired with its direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "size" => Ok(SortKey::Size),
            other => Err(format!("Unknown sort key: {}", other)),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("Unknown sort direction: {}", other)),
        }
    }
}

fn kind_rank(kind: EntryKind) -> u8 {
    match kind {
        EntryKind::Directory => 0,
        EntryKind::File => 1,
    }
}

fn compare_by_key(a: &Entry, b: &Entry, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name().to_lowercase().cmp(&b.name().to_lowercase()),
        SortKey::Size => a.size().unwrap_or(0).cmp(&b.size().unwrap_or(0)),
    }
}

/// Stable sort of `entries` under `order`.
pub fn sort(mut entries: Vec<Entry>, order: SortOrder) -> Vec<Entry> {
    entries.sort_by(|a, b| {
        kind_rank(a.kind())
            .cmp(&kind_rank(b.kind()))
            .then_with(|| {
                let secondary = compare_by_key(a, b, order.key);
                match order.direction {
                    SortDirection::Asc => secondary,
                    SortDirection::Desc => secondary.reverse(),
                }
            })
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::normalize;

    fn dir(name: &str) -> Entry {
        Entry::directory(name, normalize(name))
    }

    fn file(name: &str, size: u64) -> Entry {
        Entry::file(name, normalize(name), size, None)
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name()).collect()
    }

    #[test]
    fn test_sort_by_name_pins_directories() {
        let entries = vec![dir("dirB"), file("fileA", 3), dir("dirA"), file("fileB", 1)];
        let sorted = sort(entries, SortOrder::new(SortKey::Name, SortDirection::Asc));
        assert_eq!(names(&sorted), vec!["dirA", "dirB", "fileA", "fileB"]);
    }

    #[test]
    fn test_sort_by_size_desc_keeps_directories_first() {
        let entries = vec![dir("dirB"), file("small", 1), dir("dirA"), file("big", 30), file("mid", 7)];
        let sorted = sort(entries, SortOrder::new(SortKey::Size, SortDirection::Desc));
        // Directories tie at size 0 and keep their input order.
        assert_eq!(names(&sorted), vec!["dirB", "dirA", "big", "mid", "small"]);
    }

    #[test]
    fn test_name_sort_is_case_insensitive() {
        let entries = vec![file("beta", 1), file("Alpha", 1), file("alpha2", 1)];
        let sorted = sort(entries, SortOrder::default());
        assert_eq!(names(&sorted), vec!["Alpha", "alpha2", "beta"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let entries = vec![file("x", 5), file("y", 5), file("z", 5)];
        let sorted = sort(entries, SortOrder::new(SortKey::Size, SortDirection::Desc));
        assert_eq!(names(&sorted), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_parse_sort_options() {
        assert_eq!("SIZE".parse::<SortKey>(), Ok(SortKey::Size));
        assert_eq!("desc".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert!("date".parse::<SortKey>().is_err());
    }
}
