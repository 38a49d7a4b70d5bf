//! Domain model for users, routines, tasks, schedulers and snippets.
//!
//! # Responsibility
//! - Define the canonical records persisted by the resource store.
//! - Own field-level invariants (lengths, charsets, choice sets).
//!
//! # Invariants
//! - Every record is identified by a store-assigned integer id.
//! - Routines and snippets carry exactly one owner, fixed at creation.
//! - Repositories call `validate()` before any SQL mutation.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod routine;
pub mod scheduler;
pub mod snippet;
pub mod task;
pub mod user;

/// Store-assigned primary key shared by every entity table.
pub type EntityId = i64;

/// Field-level invariant violation raised by model validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelValidationError {
    /// Exposed field name the violation is reported under.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl ModelValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Error for ModelValidationError {}

/// Returns the first violation from a field error list.
pub(crate) fn first_violation(
    errors: Vec<ModelValidationError>,
) -> Result<(), ModelValidationError> {
    match errors.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Checks a title-like field against an inclusive character range.
pub(crate) fn check_length(
    field: &'static str,
    value: &str,
    min_chars: usize,
    max_chars: usize,
    errors: &mut Vec<ModelValidationError>,
) {
    let chars = value.chars().count();
    if chars < min_chars {
        errors.push(ModelValidationError::new(field, "This field may not be blank."));
    } else if chars > max_chars {
        errors.push(ModelValidationError::new(
            field,
            format!("Ensure this field has no more than {max_chars} characters."),
        ));
    }
}
