//! Routine record: a titled collection of tasks owned by one user.
//!
//! # Invariants
//! - `owner_id` is stamped from the acting identity at creation and never
//!   rewritten afterwards; update paths do not touch it.
//! - `title` is 1..=100 characters.

use super::user::UserId;
use super::{check_length, first_violation, EntityId, ModelValidationError};

pub type RoutineId = EntityId;

pub const ROUTINE_TITLE_MAX_CHARS: usize = 100;

/// Persisted routine row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    pub id: RoutineId,
    pub title: String,
    pub owner_id: UserId,
    /// Resolved from `users.username` on read; ignored on write.
    pub owner_username: String,
}

/// Insert shape for a new routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoutine {
    pub title: String,
    pub owner_id: UserId,
}

impl Routine {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        first_violation(validate_routine_title(&self.title))
    }
}

impl NewRoutine {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        first_violation(validate_routine_title(&self.title))
    }
}

pub fn validate_routine_title(title: &str) -> Vec<ModelValidationError> {
    let mut errors = Vec::new();
    check_length("title", title, 1, ROUTINE_TITLE_MAX_CHARS, &mut errors);
    errors
}
