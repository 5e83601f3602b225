//! File system storage management
//!
//! Handles path containment and the file operations exposed over HTTP.

pub mod filesystem;
pub mod operations;
pub mod results;
pub mod validation;

pub use operations::{
    UploadedFile, create_folder, delete_file, list_directory, open_download, upload_files,
};
pub use results::{DirectoryListing, Download, UploadFailure, UploadReport};
pub use validation::{ResolvedPath, Root, resolve, sanitize_filename};
