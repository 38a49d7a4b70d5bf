//! Access policy for resource handlers.
//!
//! # Responsibility
//! - Model the acting identity of a request.
//! - Decide, per resource type and action, whether that identity may proceed.
//!
//! # Invariants
//! - Read actions never require ownership.
//! - A denial for an anonymous identity is always `NotAuthenticated`.
//! - Policy checks are pure: they never touch the store.

use crate::model::user::UserId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod access;

pub use access::{
    Permission, ResourcePolicy, ROUTINE_POLICY, SCHEDULER_POLICY, SNIPPET_POLICY, TASK_POLICY,
    USER_POLICY,
};

/// Identity associated with the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    User { id: UserId, username: String },
}

impl Identity {
    pub fn user(id: UserId, username: impl Into<String>) -> Self {
        Self::User {
            id,
            username: username.into(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    /// Stable comparable id for authenticated identities.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User { id, .. } => Some(*id),
        }
    }

    /// Short label for log lines.
    pub fn log_label(&self) -> String {
        match self {
            Self::Anonymous => "anonymous".to_string(),
            Self::User { id, .. } => format!("user:{id}"),
        }
    }
}

/// Handler operation being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Action {
    /// Whether the action is a safe read.
    pub fn is_read(self) -> bool {
        matches!(self, Self::List | Self::Retrieve)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Retrieve => "retrieve",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Rejection produced by a failed policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No credentials were presented.
    NotAuthenticated,
    /// Credentials were presented but do not grant the action.
    PermissionDenied,
}

impl Denial {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotAuthenticated => "not_authenticated",
            Self::PermissionDenied => "permission_denied",
        }
    }
}

impl Display for Denial {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthenticated => {
                write!(f, "Authentication credentials were not provided.")
            }
            Self::PermissionDenied => {
                write!(f, "You do not have permission to perform this action.")
            }
        }
    }
}

impl Error for Denial {}
