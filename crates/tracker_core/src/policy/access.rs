//! Per-resource permission sets and their evaluation.
//!
//! A policy is an ordered list of permissions; every permission must grant.
//! Evaluation has two phases: `check_collection` runs before any store
//! access, `check_object` runs against the loaded record's owner.

use super::{Action, Denial, Identity};
use crate::model::user::UserId;
use log::warn;

/// One permission building block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Every action requires an authenticated identity.
    IsAuthenticated,
    /// Reads are open; writes require an authenticated identity.
    IsAuthenticatedOrReadOnly,
    /// Object writes require the acting identity to be the stored owner.
    IsOwnerOrReadOnly,
}

impl Permission {
    fn grants_collection(self, identity: &Identity, action: Action) -> bool {
        match self {
            Self::IsAuthenticated => identity.is_authenticated(),
            Self::IsAuthenticatedOrReadOnly => action.is_read() || identity.is_authenticated(),
            Self::IsOwnerOrReadOnly => true,
        }
    }

    fn grants_object(self, identity: &Identity, action: Action, owner: UserId) -> bool {
        match self {
            Self::IsOwnerOrReadOnly => action.is_read() || identity.user_id() == Some(owner),
            Self::IsAuthenticated | Self::IsAuthenticatedOrReadOnly => true,
        }
    }
}

/// Decision function for one resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePolicy {
    resource: &'static str,
    permissions: &'static [Permission],
}

/// Routines: authenticated access only; writes limited to the owner.
pub const ROUTINE_POLICY: ResourcePolicy = ResourcePolicy {
    resource: "routine",
    permissions: &[Permission::IsAuthenticated, Permission::IsOwnerOrReadOnly],
};

/// Tasks: any authenticated identity may read and write any task.
pub const TASK_POLICY: ResourcePolicy = ResourcePolicy {
    resource: "task",
    permissions: &[Permission::IsAuthenticated],
};

/// Schedulers: any authenticated identity may read and write any scheduler.
pub const SCHEDULER_POLICY: ResourcePolicy = ResourcePolicy {
    resource: "scheduler",
    permissions: &[Permission::IsAuthenticated],
};

/// Snippets: open reads; writes limited to authenticated owners.
pub const SNIPPET_POLICY: ResourcePolicy = ResourcePolicy {
    resource: "snippet",
    permissions: &[
        Permission::IsAuthenticatedOrReadOnly,
        Permission::IsOwnerOrReadOnly,
    ],
};

/// Users: authenticated access only; a user record is owned by itself.
pub const USER_POLICY: ResourcePolicy = ResourcePolicy {
    resource: "user",
    permissions: &[Permission::IsAuthenticated, Permission::IsOwnerOrReadOnly],
};

impl ResourcePolicy {
    pub fn resource(&self) -> &'static str {
        self.resource
    }

    /// Collection-level check, evaluated before the store is touched.
    pub fn check_collection(&self, identity: &Identity, action: Action) -> Result<(), Denial> {
        let granted = self
            .permissions
            .iter()
            .all(|permission| permission.grants_collection(identity, action));
        self.conclude(identity, action, granted)
    }

    /// Object-level check against the stored owner of the target record.
    pub fn check_object(
        &self,
        identity: &Identity,
        action: Action,
        owner: UserId,
    ) -> Result<(), Denial> {
        let granted = self
            .permissions
            .iter()
            .all(|permission| permission.grants_object(identity, action, owner));
        self.conclude(identity, action, granted)
    }

    fn conclude(&self, identity: &Identity, action: Action, granted: bool) -> Result<(), Denial> {
        if granted {
            return Ok(());
        }

        let denial = if identity.is_authenticated() {
            Denial::PermissionDenied
        } else {
            Denial::NotAuthenticated
        };
        warn!(
            "event=policy_denied module=policy status=denied resource={} action={} identity={} reason={}",
            self.resource,
            action.as_str(),
            identity.log_label(),
            denial.as_str()
        );
        Err(denial)
    }
}
