//! Core domain logic for the routine tracker.
//!
//! Storage, validation, access policy and projection live here; transports
//! (HTTP server, CLI) only translate requests into handler calls.

pub mod db;
pub mod handler;
pub mod highlight;
pub mod logging;
pub mod model;
pub mod policy;
pub mod projection;
pub mod repo;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use handler::{
    HandlerError, HandlerResult, Operation, RequestContext, Resource, ResourceHandler,
    RoutineHandler, SchedulerHandler, SnippetHandler, TaskHandler, UserHandler,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::{EntityId, ModelValidationError};
pub use policy::{Action, Denial, Identity};
pub use projection::{LinkBuilder, ValidationErrors};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};

/// Minimal liveness probe.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
