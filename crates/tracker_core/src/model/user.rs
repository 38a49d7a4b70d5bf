//! User identity record.
//!
//! # Invariants
//! - `username` is unique across the store (enforced by the `users` table).
//! - `username` is 1..=150 characters of letters, digits and `@ . + - _`.

use super::{check_length, first_violation, EntityId, ModelValidationError};
use once_cell::sync::Lazy;
use regex::Regex;

/// Identifier of a stored user; also the identity compared by the access policy.
pub type UserId = EntityId;

pub const USERNAME_MAX_CHARS: usize = 150;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

/// Persisted user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }

    /// Validates username invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        first_violation(validate_username(&self.username))
    }
}

/// Returns every violation of the username rules.
pub fn validate_username(username: &str) -> Vec<ModelValidationError> {
    let mut errors = Vec::new();
    check_length("username", username, 1, USERNAME_MAX_CHARS, &mut errors);
    if errors.is_empty() && !USERNAME_RE.is_match(username) {
        errors.push(ModelValidationError::new(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::{validate_username, User};

    #[test]
    fn accepts_conventional_usernames() {
        assert!(User::new(1, "alice").validate().is_ok());
        assert!(User::new(1, "first.last+tag@example-host_1").validate().is_ok());
    }

    #[test]
    fn rejects_blank_and_oversized_usernames() {
        let blank = User::new(1, "").validate().expect_err("blank must fail");
        assert_eq!(blank.field, "username");

        let long = "a".repeat(151);
        let errors = validate_username(&long);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("150"));
    }

    #[test]
    fn rejects_whitespace_and_symbols() {
        assert!(!validate_username("alice smith").is_empty());
        assert!(!validate_username("alice!").is_empty());
    }
}
