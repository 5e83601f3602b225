//! Credential storage
//!
//! Holds the static username/password table loaded from configuration.

use std::collections::HashMap;

/// In-memory user table, read-only after startup
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(users: HashMap<String, String>) -> Self {
        Self { users }
    }

    pub fn password_for(&self, username: &str) -> Option<&str> {
        self.users.get(username).map(String::as_str)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for CredentialStore {
    fn from(users: [(&str, &str); N]) -> Self {
        Self::new(
            users
                .into_iter()
                .map(|(u, p)| (u.to_string(), p.to_string()))
                .collect(),
        )
    }
}
