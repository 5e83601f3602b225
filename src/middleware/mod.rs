//! Server middleware
//!
//! Provides the session gate and the upload size limit.

pub mod auth;
pub mod upload_limit;

pub use auth::{CurrentUser, SESSION_COOKIE, require_session};
pub use upload_limit::enforce_upload_limit;
