//! Routine projection.
//!
//! Read: `url`, `id`, `title`, `owner`, `tasks`. Write: `title`.

use super::{required, LinkBuilder, PayloadReader, ValidationErrors, WriteMode};
use crate::model::routine::{validate_routine_title, NewRoutine, Routine, RoutineId};
use crate::model::task::TaskId;
use crate::model::user::UserId;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutineView {
    pub url: String,
    pub id: RoutineId,
    pub title: String,
    /// Owner's username; read-only.
    pub owner: String,
    /// Task detail URLs; read-only.
    pub tasks: Vec<String>,
}

impl RoutineView {
    pub fn project(routine: &Routine, task_ids: &[TaskId], links: &LinkBuilder) -> Self {
        Self {
            url: links.detail("routines", routine.id),
            id: routine.id,
            title: routine.title.clone(),
            owner: routine.owner_username.clone(),
            tasks: task_ids
                .iter()
                .map(|task_id| links.detail("tasks", *task_id))
                .collect(),
        }
    }
}

/// Selects the write fields of a create payload; `owner_id` comes from the
/// acting identity, never from the payload.
pub fn read_routine_create(
    payload: &Value,
    owner_id: UserId,
) -> Result<NewRoutine, ValidationErrors> {
    let mut reader = PayloadReader::new(payload, WriteMode::Create)?;
    let title = reader.text("title", true);
    if let Some(title) = &title {
        reader.check(validate_routine_title(title));
    }
    reader.finish()?;

    Ok(NewRoutine {
        title: required("title", title)?,
        owner_id,
    })
}

/// Applies the write fields of an update payload onto `existing`.
pub fn read_routine_update(
    payload: &Value,
    mode: WriteMode,
    existing: &Routine,
) -> Result<Routine, ValidationErrors> {
    let mut reader = PayloadReader::new(payload, mode)?;
    let mut routine = existing.clone();
    if let Some(title) = reader.text("title", true) {
        reader.check(validate_routine_title(&title));
        routine.title = title;
    }
    reader.finish()?;
    Ok(routine)
}

#[cfg(test)]
mod tests {
    use super::{read_routine_create, read_routine_update, RoutineView};
    use crate::model::routine::Routine;
    use crate::projection::{LinkBuilder, WriteMode};
    use serde_json::json;

    fn stored() -> Routine {
        Routine {
            id: 7,
            title: "Morning".to_string(),
            owner_id: 1,
            owner_username: "alice".to_string(),
        }
    }

    #[test]
    fn view_exposes_allow_listed_fields() {
        let view = RoutineView::project(&stored(), &[3, 4], &LinkBuilder::default());
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(
            value,
            json!({
                "url": "/routines/7",
                "id": 7,
                "title": "Morning",
                "owner": "alice",
                "tasks": ["/tasks/3", "/tasks/4"],
            })
        );
    }

    #[test]
    fn create_ignores_payload_owner() {
        let draft = read_routine_create(&json!({"title": "Evening", "owner": 99}), 1).unwrap();
        assert_eq!(draft.owner_id, 1);
        assert_eq!(draft.title, "Evening");
    }

    #[test]
    fn create_requires_non_blank_title() {
        let missing = read_routine_create(&json!({}), 1).unwrap_err();
        assert_eq!(missing.fields().collect::<Vec<_>>(), vec!["title"]);

        let blank = read_routine_create(&json!({"title": ""}), 1).unwrap_err();
        assert!(blank.messages("title")[0].contains("blank"));
    }

    #[test]
    fn replace_requires_title_but_partial_does_not() {
        assert!(read_routine_update(&json!({}), WriteMode::Replace, &stored()).is_err());

        let unchanged = read_routine_update(&json!({}), WriteMode::Partial, &stored()).unwrap();
        assert_eq!(unchanged, stored());

        let renamed =
            read_routine_update(&json!({"title": "Dawn"}), WriteMode::Partial, &stored()).unwrap();
        assert_eq!(renamed.title, "Dawn");
        assert_eq!(renamed.owner_id, 1);
    }
}
