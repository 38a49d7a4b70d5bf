//! Projection layer: stored entities to exposed fields and back.
//!
//! # Responsibility
//! - Define the read view (allow-listed output fields) of every entity.
//! - Select and type-check the write allow-list from JSON payloads.
//! - Collect every offending field instead of stopping at the first one.
//!
//! # Invariants
//! - Fields outside a write allow-list are ignored, never rejected.
//! - Read-only fields (`owner`, `id`, links) are never taken from payloads.

use crate::model::{EntityId, ModelValidationError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod links;
pub mod routine;
pub mod scheduler;
pub mod snippet;
pub mod task;
pub mod user;

pub use links::LinkBuilder;

/// Error key used for payload-level (not field-level) problems.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";
pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const NULL_MESSAGE: &str = "This field may not be null.";

/// Field name to messages map reported for rejected payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Appends every message of `other`.
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn extend_model(&mut self, errors: Vec<ModelValidationError>) {
        for err in errors {
            self.push(err.field, err.message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl Error for ValidationErrors {}

impl From<ModelValidationError> for ValidationErrors {
    fn from(value: ModelValidationError) -> Self {
        Self::single(value.field, value.message)
    }
}

/// Which write operation a payload feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Required fields must be present; defaults fill optional ones.
    Create,
    /// Full update: same presence rules as `Create`.
    Replace,
    /// Partial update: every field is optional.
    Partial,
}

impl WriteMode {
    pub fn is_partial(self) -> bool {
        self == Self::Partial
    }
}

/// Typed field access over one JSON object payload.
///
/// Accessors return `None` for absent or invalid fields; invalid and missing
/// required fields are recorded and surface from `finish()`.
pub struct PayloadReader<'a> {
    object: &'a Map<String, Value>,
    mode: WriteMode,
    errors: ValidationErrors,
}

impl<'a> PayloadReader<'a> {
    pub fn new(payload: &'a Value, mode: WriteMode) -> Result<Self, ValidationErrors> {
        match payload {
            Value::Object(object) => Ok(Self {
                object,
                mode,
                errors: ValidationErrors::new(),
            }),
            other => Err(ValidationErrors::single(
                NON_FIELD_ERRORS,
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_type_name(other)
                ),
            )),
        }
    }

    /// Records an extra error under `field`.
    pub fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(field, message);
    }

    /// Whether `field` already carries an error.
    pub fn rejected(&self, field: &str) -> bool {
        !self.errors.messages(field).is_empty()
    }

    /// Records model invariant violations found on already-typed values.
    pub fn check(&mut self, violations: Vec<ModelValidationError>) {
        self.errors.extend_model(violations);
    }

    /// Reads a non-null string field.
    pub fn text(&mut self, field: &str, required: bool) -> Option<String> {
        match self.present(field, required)? {
            Value::String(value) => Some(value.clone()),
            Value::Null => self.invalid(field, NULL_MESSAGE),
            _ => self.invalid(field, "Not a valid string."),
        }
    }

    /// Reads a string field that may be explicitly `null`.
    pub fn nullable_text(&mut self, field: &str, required: bool) -> Option<Option<String>> {
        match self.present(field, required)? {
            Value::String(value) => Some(Some(value.clone())),
            Value::Null => Some(None),
            _ => self.invalid(field, "Not a valid string."),
        }
    }

    pub fn boolean(&mut self, field: &str, required: bool) -> Option<bool> {
        match self.present(field, required)? {
            Value::Bool(value) => Some(*value),
            Value::Null => self.invalid(field, NULL_MESSAGE),
            _ => self.invalid(field, "Must be a valid boolean."),
        }
    }

    /// Reads a non-null primary key reference.
    pub fn primary_key(&mut self, field: &str, required: bool) -> Option<EntityId> {
        match self.present(field, required)? {
            Value::Null => self.invalid(field, NULL_MESSAGE),
            value => self.pk_value(field, value),
        }
    }

    /// Reads a primary key reference that may be explicitly `null`.
    pub fn nullable_primary_key(
        &mut self,
        field: &str,
        required: bool,
    ) -> Option<Option<EntityId>> {
        match self.present(field, required)? {
            Value::Null => Some(None),
            value => self.pk_value(field, value).map(Some),
        }
    }

    /// Returns the collected errors, if any.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        self.errors.into_result()
    }

    fn present(&mut self, field: &str, required: bool) -> Option<&'a Value> {
        let value = self.object.get(field);
        if value.is_none() && required && !self.mode.is_partial() {
            self.errors.push(field, REQUIRED_MESSAGE);
        }
        value
    }

    fn pk_value(&mut self, field: &str, value: &Value) -> Option<EntityId> {
        match value.as_i64() {
            Some(id) => Some(id),
            None => self.invalid(
                field,
                format!(
                    "Incorrect type. Expected pk value, received {}.",
                    json_type_name(value)
                ),
            ),
        }
    }

    fn invalid<T>(&mut self, field: &str, message: impl Into<String>) -> Option<T> {
        self.errors.push(field, message);
        None
    }
}

/// Unwraps a required value whose presence `finish()` already verified.
pub(crate) fn required<T>(field: &str, value: Option<T>) -> Result<T, ValidationErrors> {
    value.ok_or_else(|| ValidationErrors::single(field, REQUIRED_MESSAGE))
}

/// Message for a reference to a row that does not exist.
pub fn missing_reference_message(id: EntityId) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::{PayloadReader, ValidationErrors, WriteMode, NON_FIELD_ERRORS, REQUIRED_MESSAGE};
    use serde_json::json;

    #[test]
    fn rejects_non_object_payloads() {
        let err = PayloadReader::new(&json!([1, 2]), WriteMode::Create)
            .err()
            .expect("arrays must be rejected");
        assert!(err.messages(NON_FIELD_ERRORS)[0].contains("got list"));
    }

    #[test]
    fn collects_every_offending_field() {
        let payload = json!({"title": 5, "linenos": "yes", "routine": "x"});
        let mut reader = PayloadReader::new(&payload, WriteMode::Create).unwrap();
        assert_eq!(reader.text("title", true), None);
        assert_eq!(reader.boolean("linenos", false), None);
        assert_eq!(reader.primary_key("routine", true), None);
        assert_eq!(reader.text("code", true), None);

        let errors = reader.finish().unwrap_err();
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(fields, vec!["code", "linenos", "routine", "title"]);
        assert_eq!(errors.messages("code"), [REQUIRED_MESSAGE.to_string()]);
    }

    #[test]
    fn partial_mode_does_not_require_fields() {
        let payload = json!({});
        let mut reader = PayloadReader::new(&payload, WriteMode::Partial).unwrap();
        assert_eq!(reader.text("title", true), None);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn nullable_accessors_distinguish_null_from_absent() {
        let payload = json!({"schedule": null, "day": null});
        let mut reader = PayloadReader::new(&payload, WriteMode::Replace).unwrap();
        assert_eq!(reader.nullable_primary_key("schedule", false), Some(None));
        assert_eq!(reader.nullable_text("day", false), Some(None));
        assert_eq!(reader.nullable_text("missing", false), None);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn serializes_as_plain_field_map() {
        let mut errors = ValidationErrors::new();
        errors.push("title", "bad");
        errors.push("title", "worse");
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value, json!({"title": ["bad", "worse"]}));
    }
}
