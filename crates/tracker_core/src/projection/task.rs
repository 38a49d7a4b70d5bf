//! Task projection.
//!
//! Read and write: `title`, `routine`, `schedule`. References are checked
//! for existence by the handler, which owns the store.

use super::{required, PayloadReader, ValidationErrors, WriteMode};
use crate::model::routine::RoutineId;
use crate::model::scheduler::SchedulerId;
use crate::model::task::{validate_task_title, NewTask, Task};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub title: String,
    pub routine: RoutineId,
    pub schedule: Option<SchedulerId>,
}

impl TaskView {
    pub fn project(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            routine: task.routine_id,
            schedule: task.schedule_id,
        }
    }
}

pub fn read_task_create(payload: &Value) -> Result<NewTask, ValidationErrors> {
    let mut reader = PayloadReader::new(payload, WriteMode::Create)?;
    let title = reader.text("title", true);
    if let Some(title) = &title {
        reader.check(validate_task_title(title));
    }
    let routine_id = reader.primary_key("routine", true);
    let schedule_id = reader.nullable_primary_key("schedule", false);
    reader.finish()?;

    Ok(NewTask {
        title: required("title", title)?,
        routine_id: required("routine", routine_id)?,
        schedule_id: schedule_id.flatten(),
    })
}

pub fn read_task_update(
    payload: &Value,
    mode: WriteMode,
    existing: &Task,
) -> Result<Task, ValidationErrors> {
    let mut reader = PayloadReader::new(payload, mode)?;
    let mut task = existing.clone();
    if let Some(title) = reader.text("title", true) {
        reader.check(validate_task_title(&title));
        task.title = title;
    }
    if let Some(routine_id) = reader.primary_key("routine", true) {
        task.routine_id = routine_id;
    }
    if let Some(schedule_id) = reader.nullable_primary_key("schedule", false) {
        task.schedule_id = schedule_id;
    }
    reader.finish()?;
    Ok(task)
}
