//! Storage result types
//!
//! Defines result structures returned by storage operations.

use std::fs::File;

/// Contents of one directory, split by entry type and sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    /// Canonical relative path of the listed directory, `""` for the root
    pub path: String,
    pub folders: Vec<String>,
    pub files: Vec<String>,
}

impl DirectoryListing {
    /// Relative path of the parent folder, `None` when listing the root.
    pub fn parent(&self) -> Option<&str> {
        if self.path.is_empty() {
            None
        } else {
            Some(super::validation::parent_relative(&self.path))
        }
    }
}

/// A file that could not be stored during a multi-file upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
    pub name: String,
    pub reason: String,
}

/// Outcome of an upload; every file is reported either as saved or failed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub saved: Vec<String>,
    pub failed: Vec<UploadFailure>,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// An opened file ready to be streamed to the client
#[derive(Debug)]
pub struct Download {
    pub file: File,
    pub file_name: String,
    pub len: u64,
    pub content_type: String,
}
