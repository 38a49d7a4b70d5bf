//! Explicit collection-name to handler registry.

use super::{
    HandlerError, HandlerResult, RequestContext, ResourceHandler, RoutineHandler,
    SchedulerHandler, SnippetHandler, TaskHandler, UserHandler,
};
use crate::model::EntityId;
use crate::policy::Action;
use serde::Serialize;
use serde_json::Value;

/// Every resource collection exposed by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Routines,
    Tasks,
    Schedulers,
    Snippets,
}

/// One handler invocation, decoupled from any transport.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'p> {
    List,
    Get(EntityId),
    Create(&'p Value),
    Update {
        id: EntityId,
        payload: &'p Value,
        partial: bool,
    },
    Delete(EntityId),
}

impl Operation<'_> {
    pub fn action(&self) -> Action {
        match self {
            Self::List => Action::List,
            Self::Get(_) => Action::Retrieve,
            Self::Create(_) => Action::Create,
            Self::Update { .. } => Action::Update,
            Self::Delete(_) => Action::Delete,
        }
    }
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Users,
        Resource::Routines,
        Resource::Tasks,
        Resource::Schedulers,
        Resource::Snippets,
    ];

    /// Resolves a URL collection segment such as `routines`.
    pub fn from_collection(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|resource| resource.collection() == value)
    }

    pub fn collection(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Routines => "routines",
            Self::Tasks => "tasks",
            Self::Schedulers => "schedulers",
            Self::Snippets => "snippets",
        }
    }

    /// Runs `operation` on this resource's handler.
    ///
    /// Returns the JSON view, or `None` for a completed delete.
    pub fn dispatch(
        self,
        ctx: &RequestContext<'_>,
        operation: Operation<'_>,
    ) -> HandlerResult<Option<Value>> {
        match self {
            Self::Users => run(&UserHandler, ctx, operation),
            Self::Routines => run(&RoutineHandler, ctx, operation),
            Self::Tasks => run(&TaskHandler, ctx, operation),
            Self::Schedulers => run(&SchedulerHandler, ctx, operation),
            Self::Snippets => run(&SnippetHandler, ctx, operation),
        }
    }
}

fn run<H: ResourceHandler>(
    handler: &H,
    ctx: &RequestContext<'_>,
    operation: Operation<'_>,
) -> HandlerResult<Option<Value>> {
    match operation {
        Operation::List => encode(&handler.list(ctx)?).map(Some),
        Operation::Get(id) => encode(&handler.get(ctx, id)?).map(Some),
        Operation::Create(payload) => encode(&handler.create(ctx, payload)?).map(Some),
        Operation::Update {
            id,
            payload,
            partial,
        } => encode(&handler.update(ctx, id, payload, partial)?).map(Some),
        Operation::Delete(id) => {
            handler.delete(ctx, id)?;
            Ok(None)
        }
    }
}

fn encode<T: Serialize>(view: &T) -> HandlerResult<Value> {
    serde_json::to_value(view).map_err(HandlerError::Encode)
}
