//! Error handlers
//!
//! Maps server errors to HTTP responses. Bodies are generic on purpose:
//! they never contain a filesystem path or reveal whether a denied target exists.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use log::{error, warn};

use crate::error::types::{AuthError, ServerError, StorageError};

/// Log a server error at a level matching its severity
pub fn handle_error(err: &ServerError) {
    match error_to_status(err) {
        status if status.is_server_error() => error!("Request failed: {}", err),
        _ => warn!("Request rejected: {}", err),
    }
}

/// Convert error to HTTP status code
pub fn error_to_status(err: &ServerError) -> StatusCode {
    match err {
        ServerError::Auth(AuthError::NotLoggedIn) => StatusCode::SEE_OTHER,
        ServerError::Auth(_) => StatusCode::UNAUTHORIZED,
        ServerError::Storage(e) => storage_status(e),
        ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Config(_) | ServerError::IoError(_) | ServerError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn storage_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::AccessDenied(_) => StatusCode::FORBIDDEN,
        StorageError::FileNotFound(_) | StorageError::DirectoryNotFound(_) => StatusCode::NOT_FOUND,
        StorageError::NotADirectory(_) | StorageError::IsADirectory(_) => StatusCode::FORBIDDEN,
        StorageError::InvalidName(_) => StatusCode::BAD_REQUEST,
        StorageError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing text for a storage failure
pub fn storage_message(err: &StorageError) -> &'static str {
    match err {
        StorageError::AccessDenied(_) => "Access Denied",
        StorageError::FileNotFound(_) => "File not found",
        StorageError::DirectoryNotFound(_) => "Path not found",
        StorageError::NotADirectory(_) => "Not a directory",
        StorageError::IsADirectory(_) => "Is a directory",
        StorageError::InvalidName(_) => "Invalid file name",
        StorageError::IoError(_) => "Internal server error",
    }
}

/// Human-readable size used in the 413 body, e.g. "10 GB"
pub fn format_size(bytes: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1 << 30, "GB"), (1 << 20, "MB"), (1 << 10, "KB")];

    for (unit, suffix) in UNITS {
        if bytes >= unit && bytes % unit == 0 {
            return format!("{} {}", bytes / unit, suffix);
        }
    }
    format!("{} bytes", bytes)
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        handle_error(&self);

        let status = error_to_status(&self);
        match self {
            ServerError::Auth(AuthError::NotLoggedIn) => Redirect::to("/login").into_response(),
            ServerError::Auth(_) => (status, "Invalid username or password").into_response(),
            ServerError::Storage(e) => (status, storage_message(&e)).into_response(),
            ServerError::PayloadTooLarge(limit) => (
                status,
                format!("File too large. Maximum size is {}.", format_size(limit)),
            )
                .into_response(),
            ServerError::BadRequest(_) => (status, "Bad request").into_response(),
            _ => (status, "Internal server error").into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_expected_statuses() {
        let cases = [
            (StorageError::AccessDenied("../x".into()), StatusCode::FORBIDDEN),
            (StorageError::FileNotFound("x".into()), StatusCode::NOT_FOUND),
            (StorageError::DirectoryNotFound("x".into()), StatusCode::NOT_FOUND),
            (StorageError::NotADirectory("x".into()), StatusCode::FORBIDDEN),
            (StorageError::IsADirectory("x".into()), StatusCode::FORBIDDEN),
        ];
        for (err, expected) in cases {
            assert_eq!(error_to_status(&ServerError::Storage(err)), expected);
        }
    }

    #[test]
    fn not_logged_in_redirects_to_login() {
        let response = ServerError::Auth(AuthError::NotLoggedIn).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/login");
    }

    #[test]
    fn access_denied_body_does_not_echo_the_path() {
        let err = StorageError::AccessDenied("../../etc/passwd".into());
        assert_eq!(storage_message(&err), "Access Denied");
    }

    #[test]
    fn format_size_picks_largest_exact_unit() {
        assert_eq!(format_size(10 * 1024 * 1024 * 1024), "10 GB");
        assert_eq!(format_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_size(2048), "2 KB");
        assert_eq!(format_size(1500), "1500 bytes");
    }
}
