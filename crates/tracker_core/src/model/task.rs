//! Task record: one titled step inside a routine.

use super::routine::RoutineId;
use super::scheduler::SchedulerId;
use super::{check_length, first_violation, EntityId, ModelValidationError};

pub type TaskId = EntityId;

pub const TASK_TITLE_MAX_CHARS: usize = 100;

/// Persisted task row.
///
/// `schedule_id` is optional so a task can exist before its scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub routine_id: RoutineId,
    pub schedule_id: Option<SchedulerId>,
}

/// Insert shape for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub routine_id: RoutineId,
    pub schedule_id: Option<SchedulerId>,
}

impl Task {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        first_violation(validate_task_title(&self.title))
    }
}

impl NewTask {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        first_violation(validate_task_title(&self.title))
    }
}

pub fn validate_task_title(title: &str) -> Vec<ModelValidationError> {
    let mut errors = Vec::new();
    check_length("title", title, 1, TASK_TITLE_MAX_CHARS, &mut errors);
    errors
}
