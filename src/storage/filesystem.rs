//! File system helpers
//!
//! Small wrappers over `std::fs` used by the storage operations.

use std::fs;
use std::path::Path;

/// What a resolved path currently points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Missing,
    File,
    Directory,
    /// Sockets, fifos, devices: never listed or served
    Other,
}

/// Classify a path, following symlinks the way `open` would
pub fn entry_kind(path: &Path) -> EntryKind {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => EntryKind::Directory,
        Ok(meta) if meta.is_file() => EntryKind::File,
        Ok(_) => EntryKind::Other,
        Err(_) => EntryKind::Missing,
    }
}

/// Check if file exists
pub fn file_exists(path: &Path) -> bool {
    entry_kind(path) == EntryKind::File
}

/// Check if directory exists
pub fn directory_exists(path: &Path) -> bool {
    entry_kind(path) == EntryKind::Directory
}
