//! Authentication validator
//!
//! Checks login form input against the configured credential table.

use super::credentials::CredentialStore;
use crate::error::AuthError;

/// Upper bound on username and password length accepted from the login form.
pub const MAX_CREDENTIAL_LENGTH: usize = 256;

/// Performs basic input sanitation to check for malicious or malformed usernames/passwords.
fn is_valid_input(input: &str) -> bool {
    !input.trim().is_empty()
        && input.len() <= MAX_CREDENTIAL_LENGTH
        && !input.contains(['\r', '\n', '\0'])
}

/// Validates a username/password pair.
///
/// The error says which part failed for logging; callers must show the client
/// the same message either way.
pub fn validate_login(
    username: &str,
    password: &str,
    credentials: &CredentialStore,
) -> Result<(), AuthError> {
    if !is_valid_input(username) {
        return Err(AuthError::MalformedInput("Invalid username format".into()));
    }
    if !is_valid_input(password) {
        return Err(AuthError::MalformedInput("Invalid password format".into()));
    }

    match credentials.password_for(username) {
        Some(stored) if stored == password => Ok(()),
        Some(_) => Err(AuthError::InvalidPassword(username.to_string())),
        None => Err(AuthError::UserNotFound(username.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> CredentialStore {
        CredentialStore::from([("alice", "alice123"), ("bob", "bob123")])
    }

    #[test]
    fn accepts_matching_credentials() {
        assert!(validate_login("alice", "alice123", &credentials()).is_ok());
        assert!(validate_login("bob", "bob123", &credentials()).is_ok());
    }

    #[test]
    fn rejects_wrong_password() {
        assert!(matches!(
            validate_login("alice", "bob123", &credentials()),
            Err(AuthError::InvalidPassword(u)) if u == "alice"
        ));
    }

    #[test]
    fn rejects_unknown_user() {
        assert!(matches!(
            validate_login("mallory", "alice123", &credentials()),
            Err(AuthError::UserNotFound(_))
        ));
    }

    #[test]
    fn rejects_malformed_input() {
        let too_long = "a".repeat(MAX_CREDENTIAL_LENGTH + 1);
        for (user, pass) in [
            ("", "alice123"),
            ("   ", "alice123"),
            ("alice", ""),
            ("alice\r\n", "alice123"),
            ("alice", "alice123\0"),
            (too_long.as_str(), "alice123"),
        ] {
            assert!(
                matches!(
                    validate_login(user, pass, &credentials()),
                    Err(AuthError::MalformedInput(_))
                ),
                "{user:?}/{pass:?}"
            );
        }
    }
}
