//! Namespace projection
//!
//! Turns a flat set of object keys into the entries visible at one level of
//! the virtual hierarchy.

use std::collections::HashSet;

use crate::listing::entry::{Entry, EntryKind};
use crate::path::{SEPARATOR, VirtualPath};
use crate::storage::ObjectRecord;

/// Projects `records` onto the single directory level at `prefix`.
///
/// Keys outside `prefix` are ignored, as is the key naming `prefix` itself.
/// A key with a further separator contributes a directory named after its
/// next segment. When a name comes out as both a file and a directory, the
/// directory wins. Output keeps first-appearance order.
pub fn project(records: &[ObjectRecord], prefix: &VirtualPath) -> Vec<Entry> {
    let list_prefix = prefix.list_prefix();
    let mut entries: Vec<Entry> = Vec::new();
    let mut directories: HashSet<&str> = HashSet::new();

    for record in records {
        let Some(remainder) = record.key.strip_prefix(list_prefix.as_str()) else {
            continue;
        };
        if remainder.is_empty() {
            continue;
        }

        match remainder.split_once(SEPARATOR) {
            None => entries.push(Entry::file(
                remainder,
                VirtualPath::from_key(&record.key),
                record.size,
                record.last_modified.clone(),
            )),
            Some((dir_name, _)) => {
                if dir_name.is_empty() || !directories.insert(dir_name) {
                    continue;
                }
                let path = VirtualPath::from_key(&format!("{}{}", list_prefix, dir_name));
                entries.push(Entry::directory(dir_name, path));
            }
        }
    }

    entries.retain(|entry| {
        entry.kind() == EntryKind::Directory || !directories.contains(entry.name())
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::normalize;

    fn records(keys: &[(&str, u64)]) -> Vec<ObjectRecord> {
        keys.iter()
            .map(|(key, size)| ObjectRecord::new(*key, *size))
            .collect()
    }

    fn summary(entries: &[Entry]) -> Vec<(String, EntryKind, Option<u64>)> {
        let mut rows: Vec<_> = entries
            .iter()
            .map(|e| (e.name().to_string(), e.kind(), e.size()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    #[test]
    fn test_project_root() {
        let keys = records(&[("a/b.txt", 10), ("a/c/d.txt", 5), ("e.txt", 20)]);
        let entries = project(&keys, &VirtualPath::root());
        assert_eq!(
            summary(&entries),
            vec![
                ("a".to_string(), EntryKind::Directory, None),
                ("e.txt".to_string(), EntryKind::File, Some(20)),
            ]
        );
    }

    #[test]
    fn test_project_nested_prefix() {
        let keys = records(&[("a/b.txt", 10), ("a/c/d.txt", 5), ("e.txt", 20)]);
        let entries = project(&keys, &normalize("a"));
        assert_eq!(
            summary(&entries),
            vec![
                ("b.txt".to_string(), EntryKind::File, Some(10)),
                ("c".to_string(), EntryKind::Directory, None),
            ]
        );
        let dir = entries.iter().find(|e| e.is_dir()).unwrap();
        assert_eq!(dir.path().as_str(), "a/c");
        let file = entries.iter().find(|e| !e.is_dir()).unwrap();
        assert_eq!(file.path().as_str(), "a/b.txt");
    }

    #[test]
    fn test_directory_wins_name_collision() {
        let keys = records(&[("a", 1), ("a/b.txt", 2)]);
        let entries = project(&keys, &VirtualPath::root());
        assert_eq!(
            summary(&entries),
            vec![("a".to_string(), EntryKind::Directory, None)]
        );
    }

    #[test]
    fn test_directories_are_deduplicated() {
        let keys = records(&[("docs/a.md", 1), ("docs/b.md", 2), ("docs/x/y.md", 3)]);
        let entries = project(&keys, &VirtualPath::root());
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_dir());
    }

    #[test]
    fn test_marker_and_foreign_keys_are_ignored() {
        let keys = records(&[("a/", 0), ("a", 0), ("ab/c.txt", 4), ("a/z.txt", 9)]);
        let entries = project(&keys, &normalize("a"));
        assert_eq!(
            summary(&entries),
            vec![("z.txt".to_string(), EntryKind::File, Some(9))]
        );
    }

    #[test]
    fn test_whitespace_in_keys_is_preserved() {
        let keys = records(&[(" notes.txt", 3), ("notes.txt", 8), (" old /x.txt", 1)]);
        let entries = project(&keys, &VirtualPath::root());

        let spaced = entries.iter().find(|e| e.name() == " notes.txt").unwrap();
        assert_eq!(spaced.path().as_str(), " notes.txt");
        assert_eq!(spaced.size(), Some(3));
        let plain = entries.iter().find(|e| e.name() == "notes.txt").unwrap();
        assert_eq!(plain.path().as_str(), "notes.txt");
        let dir = entries.iter().find(|e| e.is_dir()).unwrap();
        assert_eq!(dir.name(), " old ");
        assert_eq!(dir.path().as_str(), " old ");

        let nested = project(&keys, dir.path());
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].path().as_str(), " old /x.txt");
    }

    #[test]
    fn test_empty_listing() {
        assert!(project(&[], &VirtualPath::root()).is_empty());
        assert!(project(&[], &normalize("missing")).is_empty());
    }
}
