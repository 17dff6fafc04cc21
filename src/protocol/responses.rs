//! Shell response formatting

use crate::listing::Entry;
use crate::path::VirtualPath;

pub const HELP_TEXT: &str = "\
Commands:
  CONNECT <account> <container> <sas-token> [path]   open a container
  LS                                                 list the current directory
  CD <path>                                          change directory (.. and / work)
  PWD                                                print the current directory
  PUT <file>...                                      upload local files here
  GET <name> [dest]                                  download a file
  URL <name>                                         print a direct download URL
  RM <name>                                          delete a file or directory
  MKDIR <name>                                       create a directory
  SORT <name|size> [asc|desc]                        change listing order
  DISCONNECT                                         close the container
  HELP                                               show this help
  QUIT                                               leave the shell";

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Size in binary units with one decimal, e.g. `1.5 KB`.
pub fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// `/` for the root, `/a/b` otherwise.
pub fn format_path(path: &VirtualPath) -> String {
    format!("/{}", path)
}

/// One line per entry; directories carry a trailing `/`.
pub fn format_listing(path: &VirtualPath, entries: &[Entry]) -> String {
    if entries.is_empty() {
        return format!("{} is empty", format_path(path));
    }

    entries
        .iter()
        .map(|entry| match entry.size() {
            Some(size) if !entry.is_dir() => format!("{:>10}  {}", human_size(size), entry.name()),
            _ => format!("{:>10}  {}/", "-", entry.name()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
