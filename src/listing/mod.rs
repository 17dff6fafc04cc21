//! Directory listings
//!
//! Entry model, projection of flat keys onto one directory level, and
//! display ordering.

pub mod entry;
pub mod projector;
pub mod sorter;

pub use entry::{Entry, EntryKind};
pub use projector::project;
pub use sorter::{SortDirection, SortKey, SortOrder, sort};
