//! Snippet record: owned code text plus its highlighted rendering.
//!
//! # Invariants
//! - `owner_id` is stamped at creation and never rewritten.
//! - `language` names a known syntax and `style` a known theme.
//! - `highlighted` is derived from the other fields; callers refresh it via
//!   `refresh_highlighted()` before every write.

use super::user::UserId;
use super::{check_length, first_violation, EntityId, ModelValidationError};
use crate::highlight::{self, HighlightError, HighlightRequest};

pub type SnippetId = EntityId;

pub const SNIPPET_TITLE_MAX_CHARS: usize = 100;

/// Persisted snippet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub id: SnippetId,
    /// Creation time in epoch milliseconds; assigned by the store.
    pub created: i64,
    pub title: String,
    pub code: String,
    pub linenos: bool,
    pub language: String,
    pub style: String,
    pub owner_id: UserId,
    /// Resolved from `users.username` on read; ignored on write.
    pub owner_username: String,
    /// Standalone HTML document rendered from `code`.
    pub highlighted: String,
}

/// Insert shape for a new snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSnippet {
    pub title: String,
    pub code: String,
    pub linenos: bool,
    pub language: String,
    pub style: String,
    pub owner_id: UserId,
    pub highlighted: String,
}

impl Snippet {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        first_violation(validate_snippet_fields(
            &self.title,
            &self.code,
            &self.language,
            &self.style,
        ))
    }

    /// Recomputes `highlighted` from the current field values.
    pub fn refresh_highlighted(&mut self) -> Result<(), HighlightError> {
        self.highlighted = highlight::render_document(&HighlightRequest {
            code: &self.code,
            language: &self.language,
            style: &self.style,
            linenos: self.linenos,
            title: &self.title,
        })?;
        Ok(())
    }
}

impl NewSnippet {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        first_violation(validate_snippet_fields(
            &self.title,
            &self.code,
            &self.language,
            &self.style,
        ))
    }

    pub fn refresh_highlighted(&mut self) -> Result<(), HighlightError> {
        self.highlighted = highlight::render_document(&HighlightRequest {
            code: &self.code,
            language: &self.language,
            style: &self.style,
            linenos: self.linenos,
            title: &self.title,
        })?;
        Ok(())
    }
}

/// Returns every violation of the snippet field rules.
pub fn validate_snippet_fields(
    title: &str,
    code: &str,
    language: &str,
    style: &str,
) -> Vec<ModelValidationError> {
    let mut errors = validate_snippet_title(title);
    errors.extend(validate_snippet_code(code));
    errors.extend(validate_snippet_language(language));
    errors.extend(validate_snippet_style(style));
    errors
}

pub fn validate_snippet_title(title: &str) -> Vec<ModelValidationError> {
    let mut errors = Vec::new();
    check_length("title", title, 0, SNIPPET_TITLE_MAX_CHARS, &mut errors);
    errors
}

pub fn validate_snippet_code(code: &str) -> Vec<ModelValidationError> {
    if code.is_empty() {
        return vec![ModelValidationError::new(
            "code",
            "This field may not be blank.",
        )];
    }
    Vec::new()
}

pub fn validate_snippet_language(language: &str) -> Vec<ModelValidationError> {
    if highlight::is_known_language(language) {
        return Vec::new();
    }
    vec![ModelValidationError::new(
        "language",
        format!("\"{language}\" is not a valid choice."),
    )]
}

pub fn validate_snippet_style(style: &str) -> Vec<ModelValidationError> {
    if highlight::is_known_style(style) {
        return Vec::new();
    }
    vec![ModelValidationError::new(
        "style",
        format!("\"{style}\" is not a valid choice."),
    )]
}

#[cfg(test)]
mod tests {
    use super::validate_snippet_fields;
    use crate::highlight::{DEFAULT_LANGUAGE, DEFAULT_STYLE};

    #[test]
    fn default_language_and_style_are_valid() {
        let errors = validate_snippet_fields("", "print(1)\n", DEFAULT_LANGUAGE, DEFAULT_STYLE);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn reports_every_invalid_field() {
        let errors = validate_snippet_fields(&"t".repeat(101), "", "klingon", "neon");
        let fields: Vec<_> = errors.iter().map(|err| err.field).collect();
        assert_eq!(fields, vec!["title", "code", "language", "style"]);
    }
}
