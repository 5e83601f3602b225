//! Authentication system
//!
//! Handles credential validation and session management.

pub mod credentials;
pub mod session;
pub mod validator;

pub use credentials::CredentialStore;
pub use session::{Session, SessionStore};
pub use validator::validate_login;
