//! Scheduler handler: any authenticated identity; the referenced task must
//! exist.

use super::{
    dangling_references, update_mode, with_references, HandlerError, HandlerResult,
    RequestContext, ResourceHandler,
};
use crate::model::scheduler::{Scheduler, SchedulerId};
use crate::policy::{Action, SCHEDULER_POLICY};
use crate::projection::scheduler::{read_scheduler_create, read_scheduler_update, SchedulerView};
use crate::repo::scheduler_repo::{
    SchedulerListQuery, SchedulerRepository, SqliteSchedulerRepository,
};
use log::info;
use serde_json::Value;

const SCHEDULER_REFERENCES: &[(&str, &str)] = &[("task", "tasks")];

#[derive(Debug, Default, Clone, Copy)]
pub struct SchedulerHandler;

impl SchedulerHandler {
    fn load(repo: &SqliteSchedulerRepository<'_>, id: SchedulerId) -> HandlerResult<Scheduler> {
        repo.get_scheduler(id)?.ok_or(HandlerError::NotFound {
            resource: "scheduler",
            id,
        })
    }
}

impl ResourceHandler for SchedulerHandler {
    type View = SchedulerView;

    fn list(&self, ctx: &RequestContext<'_>) -> HandlerResult<Vec<SchedulerView>> {
        SCHEDULER_POLICY.check_collection(&ctx.identity, Action::List)?;
        let repo = SqliteSchedulerRepository::try_new(ctx.store)?;
        Ok(repo
            .list_schedulers(&SchedulerListQuery::default())?
            .iter()
            .map(SchedulerView::project)
            .collect())
    }

    fn get(&self, ctx: &RequestContext<'_>, id: SchedulerId) -> HandlerResult<SchedulerView> {
        SCHEDULER_POLICY.check_collection(&ctx.identity, Action::Retrieve)?;
        let repo = SqliteSchedulerRepository::try_new(ctx.store)?;
        Ok(SchedulerView::project(&Self::load(&repo, id)?))
    }

    fn create(&self, ctx: &RequestContext<'_>, payload: &Value) -> HandlerResult<SchedulerView> {
        SCHEDULER_POLICY.check_collection(&ctx.identity, Action::Create)?;
        let references = dangling_references(ctx, payload, SCHEDULER_REFERENCES)?;
        let draft = with_references(read_scheduler_create(payload), references)?;

        let repo = SqliteSchedulerRepository::try_new(ctx.store)?;
        let id = repo.create_scheduler(&draft)?;
        info!(
            "event=scheduler_create module=handler status=ok scheduler_id={id} task_id={} timing={} identity={}",
            draft.task_id,
            draft.timing.as_str(),
            ctx.identity.log_label()
        );
        Ok(SchedulerView::project(&Self::load(&repo, id)?))
    }

    fn update(
        &self,
        ctx: &RequestContext<'_>,
        id: SchedulerId,
        payload: &Value,
        partial: bool,
    ) -> HandlerResult<SchedulerView> {
        SCHEDULER_POLICY.check_collection(&ctx.identity, Action::Update)?;
        let repo = SqliteSchedulerRepository::try_new(ctx.store)?;
        let existing = Self::load(&repo, id)?;

        let references = dangling_references(ctx, payload, SCHEDULER_REFERENCES)?;
        let scheduler = with_references(
            read_scheduler_update(payload, update_mode(partial), &existing),
            references,
        )?;
        repo.update_scheduler(&scheduler)?;
        info!(
            "event=scheduler_update module=handler status=ok scheduler_id={id} partial={partial} identity={}",
            ctx.identity.log_label()
        );
        Ok(SchedulerView::project(&scheduler))
    }

    fn delete(&self, ctx: &RequestContext<'_>, id: SchedulerId) -> HandlerResult<()> {
        SCHEDULER_POLICY.check_collection(&ctx.identity, Action::Delete)?;
        let repo = SqliteSchedulerRepository::try_new(ctx.store)?;
        repo.delete_scheduler(id)?;
        info!(
            "event=scheduler_delete module=handler status=ok scheduler_id={id} identity={}",
            ctx.identity.log_label()
        );
        Ok(())
    }
}
