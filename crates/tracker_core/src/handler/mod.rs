//! Resource handlers: list/get/create/update/delete per entity type.
//!
//! # Responsibility
//! - Run the access policy before touching the store.
//! - Project stored records through the read/write allow-lists.
//! - Stamp the acting identity as owner on routine/snippet creation.
//!
//! # Invariants
//! - A denied check performs no mutation.
//! - Collection-level checks run before any store access.
//! - Handlers only talk to the store through repositories.

use crate::highlight::HighlightError;
use crate::model::EntityId;
use crate::model::user::UserId;
use crate::policy::Denial;
use crate::projection::{missing_reference_message, ValidationErrors, WriteMode};
use crate::repo::{row_exists, RepoError};
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod context;
pub mod registry;
mod routine;
mod scheduler;
mod snippet;
mod task;
mod user;

pub use context::RequestContext;
pub use registry::{Operation, Resource};
pub use routine::RoutineHandler;
pub use scheduler::SchedulerHandler;
pub use snippet::SnippetHandler;
pub use task::TaskHandler;
pub use user::{UserHandler, DUPLICATE_USERNAME_MESSAGE};

pub type HandlerResult<T> = Result<T, HandlerError>;

/// Request-scoped failure of a handler operation.
#[derive(Debug)]
pub enum HandlerError {
    /// Payload rejected; lists every offending field.
    Validation(ValidationErrors),
    /// Target id does not exist.
    NotFound { resource: &'static str, id: EntityId },
    /// Access policy denial.
    Denied(Denial),
    /// Store failure; surfaced opaquely to callers.
    Store(RepoError),
    /// Rendering of the highlighted snippet document failed.
    Highlight(HighlightError),
    /// A view could not be encoded as JSON.
    Encode(serde_json::Error),
}

impl Display for HandlerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Denied(denial) => write!(f, "{denial}"),
            Self::Store(err) => write!(f, "store failure: {err}"),
            Self::Highlight(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "view encoding failed: {err}"),
        }
    }
}

impl Error for HandlerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Denied(denial) => Some(denial),
            Self::Store(err) => Some(err),
            Self::Highlight(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::NotFound { .. } => None,
        }
    }
}

impl HandlerError {
    /// Stable machine-readable code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound { .. } => "not_found",
            Self::Denied(denial) => denial.as_str(),
            Self::Store(_) => "store_failed",
            Self::Highlight(_) => "highlight_failed",
            Self::Encode(_) => "encode_failed",
        }
    }
}

impl From<ValidationErrors> for HandlerError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<HighlightError> for HandlerError {
    fn from(value: HighlightError) -> Self {
        Self::Highlight(value)
    }
}

impl From<Denial> for HandlerError {
    fn from(value: Denial) -> Self {
        Self::Denied(value)
    }
}

impl From<RepoError> for HandlerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound {
                resource: entity,
                id,
            },
            RepoError::Validation(err) => Self::Validation(err.into()),
            other => Self::Store(other),
        }
    }
}

/// Uniform CRUD surface shared by every entity handler.
pub trait ResourceHandler {
    /// Read projection returned by every operation.
    type View: Serialize;

    fn list(&self, ctx: &RequestContext<'_>) -> HandlerResult<Vec<Self::View>>;
    fn get(&self, ctx: &RequestContext<'_>, id: EntityId) -> HandlerResult<Self::View>;
    fn create(&self, ctx: &RequestContext<'_>, payload: &Value) -> HandlerResult<Self::View>;
    /// `partial` selects PATCH semantics; otherwise every required field
    /// must be supplied.
    fn update(
        &self,
        ctx: &RequestContext<'_>,
        id: EntityId,
        payload: &Value,
        partial: bool,
    ) -> HandlerResult<Self::View>;
    fn delete(&self, ctx: &RequestContext<'_>, id: EntityId) -> HandlerResult<()>;
}

pub(crate) fn update_mode(partial: bool) -> WriteMode {
    if partial {
        WriteMode::Partial
    } else {
        WriteMode::Replace
    }
}

/// Id of the authenticated acting identity, for owner stamping.
pub(crate) fn acting_user_id(ctx: &RequestContext<'_>) -> HandlerResult<UserId> {
    ctx.identity
        .user_id()
        .ok_or(HandlerError::Denied(Denial::NotAuthenticated))
}

/// Existence errors for the integer references present in `payload`.
///
/// Each entry pairs a payload field with the table its id points into.
/// Fields without an integer value are left to the projection.
pub(crate) fn dangling_references(
    ctx: &RequestContext<'_>,
    payload: &Value,
    references: &[(&str, &str)],
) -> HandlerResult<ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for (field, table) in references {
        let Some(id) = payload.get(*field).and_then(Value::as_i64) else {
            continue;
        };
        if !row_exists(ctx.store, table, id)? {
            errors.push(field, missing_reference_message(id));
        }
    }
    Ok(errors)
}

/// Reports projection and reference errors together.
pub(crate) fn with_references<T>(
    projected: Result<T, ValidationErrors>,
    references: ValidationErrors,
) -> HandlerResult<T> {
    match projected {
        Ok(value) => references
            .into_result()
            .map(|()| value)
            .map_err(HandlerError::from),
        Err(mut errors) => {
            errors.merge(references);
            Err(HandlerError::Validation(errors))
        }
    }
}
