//! Storage operations
//!
//! Handles the file manager's filesystem operations: list, upload, download,
//! create folder and delete. Each one resolves its path through
//! [`resolve`] before touching the disk; `username` is only used for the audit log.

use log::{debug, error, info};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read};

use crate::error::StorageError;
use crate::error::handlers::storage_message;
use crate::storage::filesystem::{EntryKind, directory_exists, entry_kind, file_exists};
use crate::storage::results::{DirectoryListing, Download, UploadFailure, UploadReport};
use crate::storage::validation::{ResolvedPath, Root, join_relative, resolve, sanitize_filename};

/// A file received from the client: its original name and its bytes
pub struct UploadedFile {
    pub name: String,
    pub contents: Box<dyn Read + Send>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, contents: impl Read + Send + 'static) -> Self {
        Self {
            name: name.into(),
            contents: Box::new(contents),
        }
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Lists the immediate children of a directory
pub fn list_directory(
    root: &Root,
    username: &str,
    relative: &str,
) -> Result<DirectoryListing, StorageError> {
    let dir = resolve(root, relative)?;
    require_directory(&dir)?;

    let entries = fs::read_dir(dir.as_path()).map_err(|e| StorageError::from_io(e, relative))?;

    let mut folders = Vec::new();
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StorageError::from_io(e, relative))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        match entry_kind(&entry.path()) {
            EntryKind::Directory => folders.push(name),
            EntryKind::File => files.push(name),
            EntryKind::Missing | EntryKind::Other => {}
        }
    }
    folders.sort();
    files.sort();

    debug!(
        "User {} listed /{} ({} folders, {} files)",
        username,
        dir.relative(),
        folders.len(),
        files.len()
    );

    Ok(DirectoryListing {
        path: dir.relative().to_string(),
        folders,
        files,
    })
}

/// Stores uploaded files into an existing directory
///
/// Files are written independently and overwrite existing files of the same
/// name. A failing file does not stop or roll back the others; it is recorded
/// in the returned report.
pub fn upload_files(
    root: &Root,
    username: &str,
    relative: &str,
    files: Vec<UploadedFile>,
) -> Result<UploadReport, StorageError> {
    let dir = resolve(root, relative)?;
    require_directory(&dir)?;

    let mut report = UploadReport::default();
    for mut upload in files {
        let Some(name) = sanitize_filename(&upload.name) else {
            let err = StorageError::InvalidName(upload.name.clone());
            debug!("User {} upload skipped: {}", username, err);
            report.failed.push(UploadFailure {
                name: upload.name,
                reason: storage_message(&err).to_string(),
            });
            continue;
        };

        match store_file(root, &dir, &name, &mut upload.contents) {
            Ok(bytes) => {
                info!(
                    "User {} uploaded file: {} to /{} ({} bytes)",
                    username,
                    name,
                    dir.relative(),
                    bytes
                );
                report.saved.push(name);
            }
            Err(e) => {
                error!(
                    "User {} failed to upload file: {} to /{}: {}",
                    username,
                    name,
                    dir.relative(),
                    e
                );
                report.failed.push(UploadFailure {
                    name,
                    reason: storage_message(&e).to_string(),
                });
            }
        }
    }

    Ok(report)
}

fn store_file(
    root: &Root,
    dir: &ResolvedPath,
    name: &str,
    contents: &mut dyn Read,
) -> Result<u64, StorageError> {
    let virtual_path = join_relative(dir.relative(), name);
    let target = resolve(root, &virtual_path)?;

    if entry_kind(target.as_path()) == EntryKind::Directory {
        return Err(StorageError::IsADirectory(virtual_path));
    }

    let mut file =
        File::create(target.as_path()).map_err(|e| StorageError::from_io(e, &virtual_path))?;
    let bytes = io::copy(contents, &mut file)?;
    file.sync_all()?;
    Ok(bytes)
}

/// Opens a regular file for inline download
pub fn open_download(
    root: &Root,
    username: &str,
    relative: &str,
) -> Result<Download, StorageError> {
    let path = resolve(root, relative)?;
    if !file_exists(path.as_path()) {
        return Err(StorageError::FileNotFound(relative.to_string()));
    }

    let file = File::open(path.as_path()).map_err(|e| StorageError::from_io(e, relative))?;
    let len = file.metadata()?.len();
    let file_name = path.file_name();
    let content_type = mime_guess::from_path(&file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    info!(
        "User {} downloaded file: {} from /{}",
        username,
        file_name,
        path.parent_relative()
    );

    Ok(Download {
        file,
        file_name,
        len,
        content_type,
    })
}

/// Creates a folder (and missing intermediates) below `relative`
///
/// A name that sanitizes to nothing is ignored. Creating an existing folder
/// succeeds.
pub fn create_folder(
    root: &Root,
    username: &str,
    relative: &str,
    folder_name: &str,
) -> Result<(), StorageError> {
    let parent = resolve(root, relative)?;

    let Some(name) = sanitize_filename(folder_name) else {
        debug!(
            "User {} sent unusable folder name {:?}, nothing created",
            username, folder_name
        );
        return Ok(());
    };

    let virtual_path = join_relative(parent.relative(), &name);
    let target = resolve(root, &virtual_path)?;

    if directory_exists(target.as_path()) {
        debug!("Folder /{} already exists", target.relative());
        return Ok(());
    }

    fs::create_dir_all(target.as_path()).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => StorageError::NotADirectory(virtual_path.clone()),
        _ => StorageError::from_io(e, &virtual_path),
    })?;

    info!(
        "User {} created folder: {} in /{}",
        username,
        name,
        parent.relative()
    );
    Ok(())
}

/// Deletes a regular file and returns the relative path of its folder
///
/// Directories are never removed through this operation. A symlink is removed
/// itself, never the file it points at; links to directories count as directories.
pub fn delete_file(root: &Root, username: &str, relative: &str) -> Result<String, StorageError> {
    let trimmed = relative.trim_matches('/');
    let (parent_relative, leaf) = trimmed.rsplit_once('/').unwrap_or(("", trimmed));

    if matches!(leaf, "" | "." | "..") {
        // Whatever this names is a directory, if it resolves at all
        resolve(root, relative)?;
        return Err(StorageError::IsADirectory(relative.to_string()));
    }
    if leaf.contains('\0') {
        return Err(StorageError::AccessDenied(relative.to_string()));
    }

    let parent = resolve(root, parent_relative)?;
    let target = parent.as_path().join(leaf);

    let meta = fs::symlink_metadata(&target)
        .map_err(|_| StorageError::FileNotFound(relative.to_string()))?;
    let file_type = meta.file_type();
    if file_type.is_dir()
        || (file_type.is_symlink() && entry_kind(&target) == EntryKind::Directory)
    {
        return Err(StorageError::IsADirectory(relative.to_string()));
    }
    if !file_type.is_file() && !file_type.is_symlink() {
        return Err(StorageError::FileNotFound(relative.to_string()));
    }

    fs::remove_file(&target).map_err(|e| {
        error!("Failed to delete file {} in /{}: {}", leaf, parent.relative(), e);
        StorageError::from_io(e, relative)
    })?;

    info!(
        "User {} deleted file: {} from /{}",
        username,
        leaf,
        parent.relative()
    );
    Ok(parent.relative().to_string())
}

fn require_directory(dir: &ResolvedPath) -> Result<(), StorageError> {
    match entry_kind(dir.as_path()) {
        EntryKind::Directory => Ok(()),
        EntryKind::Missing => Err(StorageError::DirectoryNotFound(dir.relative().to_string())),
        EntryKind::File | EntryKind::Other => {
            Err(StorageError::NotADirectory(dir.relative().to_string()))
        }
    }
}
