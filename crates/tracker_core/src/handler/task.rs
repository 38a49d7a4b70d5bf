//! Task handler: any authenticated identity, references checked against the
//! store before writing.

use super::{
    dangling_references, update_mode, with_references, HandlerError, HandlerResult,
    RequestContext, ResourceHandler,
};
use crate::model::task::{Task, TaskId};
use crate::policy::{Action, TASK_POLICY};
use crate::projection::task::{read_task_create, read_task_update, TaskView};
use crate::repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
use log::info;
use serde_json::Value;

const TASK_REFERENCES: &[(&str, &str)] = &[("routine", "routines"), ("schedule", "schedulers")];

#[derive(Debug, Default, Clone, Copy)]
pub struct TaskHandler;

impl TaskHandler {
    fn load(repo: &SqliteTaskRepository<'_>, id: TaskId) -> HandlerResult<Task> {
        repo.get_task(id)?.ok_or(HandlerError::NotFound {
            resource: "task",
            id,
        })
    }
}

impl ResourceHandler for TaskHandler {
    type View = TaskView;

    fn list(&self, ctx: &RequestContext<'_>) -> HandlerResult<Vec<TaskView>> {
        TASK_POLICY.check_collection(&ctx.identity, Action::List)?;
        let repo = SqliteTaskRepository::try_new(ctx.store)?;
        Ok(repo
            .list_tasks(&TaskListQuery::default())?
            .iter()
            .map(TaskView::project)
            .collect())
    }

    fn get(&self, ctx: &RequestContext<'_>, id: TaskId) -> HandlerResult<TaskView> {
        TASK_POLICY.check_collection(&ctx.identity, Action::Retrieve)?;
        let repo = SqliteTaskRepository::try_new(ctx.store)?;
        Ok(TaskView::project(&Self::load(&repo, id)?))
    }

    fn create(&self, ctx: &RequestContext<'_>, payload: &Value) -> HandlerResult<TaskView> {
        TASK_POLICY.check_collection(&ctx.identity, Action::Create)?;
        let references = dangling_references(ctx, payload, TASK_REFERENCES)?;
        let draft = with_references(read_task_create(payload), references)?;

        let repo = SqliteTaskRepository::try_new(ctx.store)?;
        let id = repo.create_task(&draft)?;
        info!(
            "event=task_create module=handler status=ok task_id={id} routine_id={} identity={}",
            draft.routine_id,
            ctx.identity.log_label()
        );
        Ok(TaskView::project(&Self::load(&repo, id)?))
    }

    fn update(
        &self,
        ctx: &RequestContext<'_>,
        id: TaskId,
        payload: &Value,
        partial: bool,
    ) -> HandlerResult<TaskView> {
        TASK_POLICY.check_collection(&ctx.identity, Action::Update)?;
        let repo = SqliteTaskRepository::try_new(ctx.store)?;
        let existing = Self::load(&repo, id)?;

        let references = dangling_references(ctx, payload, TASK_REFERENCES)?;
        let task = with_references(
            read_task_update(payload, update_mode(partial), &existing),
            references,
        )?;
        repo.update_task(&task)?;
        info!(
            "event=task_update module=handler status=ok task_id={id} partial={partial} identity={}",
            ctx.identity.log_label()
        );
        Ok(TaskView::project(&task))
    }

    fn delete(&self, ctx: &RequestContext<'_>, id: TaskId) -> HandlerResult<()> {
        TASK_POLICY.check_collection(&ctx.identity, Action::Delete)?;
        let repo = SqliteTaskRepository::try_new(ctx.store)?;
        repo.delete_task(id)?;
        info!(
            "event=task_delete module=handler status=ok task_id={id} identity={}",
            ctx.identity.log_label()
        );
        Ok(())
    }
}
