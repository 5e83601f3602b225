//! Error types
//!
//! Defines domain-specific error types for each module of the file manager.

use std::fmt;
use std::io;

/// Authentication module errors
#[derive(Debug)]
pub enum AuthError {
    UserNotFound(String),
    InvalidPassword(String),
    MalformedInput(String),
    NotLoggedIn,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::UserNotFound(u) => write!(f, "User not found: {}", u),
            AuthError::InvalidPassword(u) => write!(f, "Invalid password for user: {}", u),
            AuthError::MalformedInput(s) => write!(f, "Malformed input: {}", s),
            AuthError::NotLoggedIn => write!(f, "User not logged in"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Storage module errors
///
/// The payload is the user-supplied relative path. It ends up in logs only;
/// HTTP responses carry a generic message.
#[derive(Debug)]
pub enum StorageError {
    AccessDenied(String),
    FileNotFound(String),
    DirectoryNotFound(String),
    NotADirectory(String),
    IsADirectory(String),
    InvalidName(String),
    IoError(io::Error),
}

impl StorageError {
    /// Maps an I/O failure on `path` to the closest storage error.
    pub fn from_io(error: io::Error, path: &str) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => StorageError::FileNotFound(path.to_string()),
            io::ErrorKind::PermissionDenied => StorageError::AccessDenied(path.to_string()),
            io::ErrorKind::NotADirectory => StorageError::NotADirectory(path.to_string()),
            io::ErrorKind::IsADirectory => StorageError::IsADirectory(path.to_string()),
            _ => StorageError::IoError(error),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::AccessDenied(p) => write!(f, "Access denied: {}", p),
            StorageError::FileNotFound(p) => write!(f, "File not found: {}", p),
            StorageError::DirectoryNotFound(p) => write!(f, "Directory not found: {}", p),
            StorageError::NotADirectory(p) => write!(f, "Not a directory: {}", p),
            StorageError::IsADirectory(p) => write!(f, "Is a directory: {}", p),
            StorageError::InvalidName(n) => write!(f, "Invalid file name: {:?}", n),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

/// General server error that encompasses all error types
#[derive(Debug)]
pub enum ServerError {
    Auth(AuthError),
    Storage(StorageError),
    Config(config::ConfigError),
    /// Request body exceeded the configured cap (in bytes).
    PayloadTooLarge(u64),
    BadRequest(String),
    IoError(io::Error),
    Internal(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Auth(e) => write!(f, "Authentication error: {}", e),
            ServerError::Storage(e) => write!(f, "Storage error: {}", e),
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::PayloadTooLarge(limit) => {
                write!(f, "Request body exceeds the {} byte limit", limit)
            }
            ServerError::BadRequest(e) => write!(f, "Bad request: {}", e),
            ServerError::IoError(e) => write!(f, "I/O error: {}", e),
            ServerError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<AuthError> for ServerError {
    fn from(error: AuthError) -> Self {
        ServerError::Auth(error)
    }
}

impl From<StorageError> for ServerError {
    fn from(error: StorageError) -> Self {
        ServerError::Storage(error)
    }
}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::IoError(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_to_nearest_storage_kind() {
        let not_found = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            StorageError::from_io(not_found, "a.txt"),
            StorageError::FileNotFound(p) if p == "a.txt"
        ));

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            StorageError::from_io(denied, "a.txt"),
            StorageError::AccessDenied(_)
        ));

        let full = io::Error::new(io::ErrorKind::StorageFull, "disk full");
        assert!(matches!(
            StorageError::from_io(full, "a.txt"),
            StorageError::IoError(_)
        ));
    }

    #[test]
    fn config_errors_convert_into_server_errors() {
        let err: ServerError = config::ConfigError::Message("port cannot be 0".into()).into();
        assert!(matches!(err, ServerError::Config(_)));
        assert_eq!(err.to_string(), "Configuration error: port cannot be 0");
    }
}
