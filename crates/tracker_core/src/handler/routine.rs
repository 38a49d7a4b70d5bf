//! Routine handler: authenticated access, owner-gated writes.

use super::{
    acting_user_id, update_mode, HandlerError, HandlerResult, RequestContext, ResourceHandler,
};
use crate::model::routine::{Routine, RoutineId};
use crate::policy::{Action, ROUTINE_POLICY};
use crate::projection::routine::{read_routine_create, read_routine_update, RoutineView};
use crate::repo::routine_repo::{RoutineListQuery, RoutineRepository, SqliteRoutineRepository};
use crate::repo::task_repo::SqliteTaskRepository;
use log::info;
use serde_json::Value;

#[derive(Debug, Default, Clone, Copy)]
pub struct RoutineHandler;

impl RoutineHandler {
    fn load(repo: &SqliteRoutineRepository<'_>, id: RoutineId) -> HandlerResult<Routine> {
        repo.get_routine(id)?.ok_or(HandlerError::NotFound {
            resource: "routine",
            id,
        })
    }

    fn view(ctx: &RequestContext<'_>, routine: &Routine) -> HandlerResult<RoutineView> {
        let task_ids = SqliteTaskRepository::try_new(ctx.store)?.task_ids_for_routine(routine.id)?;
        Ok(RoutineView::project(routine, &task_ids, ctx.links))
    }
}

impl ResourceHandler for RoutineHandler {
    type View = RoutineView;

    fn list(&self, ctx: &RequestContext<'_>) -> HandlerResult<Vec<RoutineView>> {
        ROUTINE_POLICY.check_collection(&ctx.identity, Action::List)?;
        let repo = SqliteRoutineRepository::try_new(ctx.store)?;
        repo.list_routines(&RoutineListQuery::default())?
            .iter()
            .map(|routine| Self::view(ctx, routine))
            .collect()
    }

    fn get(&self, ctx: &RequestContext<'_>, id: RoutineId) -> HandlerResult<RoutineView> {
        ROUTINE_POLICY.check_collection(&ctx.identity, Action::Retrieve)?;
        let repo = SqliteRoutineRepository::try_new(ctx.store)?;
        let routine = Self::load(&repo, id)?;
        ROUTINE_POLICY.check_object(&ctx.identity, Action::Retrieve, routine.owner_id)?;
        Self::view(ctx, &routine)
    }

    fn create(&self, ctx: &RequestContext<'_>, payload: &Value) -> HandlerResult<RoutineView> {
        ROUTINE_POLICY.check_collection(&ctx.identity, Action::Create)?;
        let draft = read_routine_create(payload, acting_user_id(ctx)?)?;
        let repo = SqliteRoutineRepository::try_new(ctx.store)?;
        let id = repo.create_routine(&draft)?;
        info!(
            "event=routine_create module=handler status=ok routine_id={id} identity={}",
            ctx.identity.log_label()
        );
        let routine = Self::load(&repo, id)?;
        Self::view(ctx, &routine)
    }

    fn update(
        &self,
        ctx: &RequestContext<'_>,
        id: RoutineId,
        payload: &Value,
        partial: bool,
    ) -> HandlerResult<RoutineView> {
        ROUTINE_POLICY.check_collection(&ctx.identity, Action::Update)?;
        let repo = SqliteRoutineRepository::try_new(ctx.store)?;
        let existing = Self::load(&repo, id)?;
        ROUTINE_POLICY.check_object(&ctx.identity, Action::Update, existing.owner_id)?;

        let routine = read_routine_update(payload, update_mode(partial), &existing)?;
        repo.update_routine(&routine)?;
        info!(
            "event=routine_update module=handler status=ok routine_id={id} partial={partial} identity={}",
            ctx.identity.log_label()
        );
        Self::view(ctx, &routine)
    }

    fn delete(&self, ctx: &RequestContext<'_>, id: RoutineId) -> HandlerResult<()> {
        ROUTINE_POLICY.check_collection(&ctx.identity, Action::Delete)?;
        let repo = SqliteRoutineRepository::try_new(ctx.store)?;
        let existing = Self::load(&repo, id)?;
        ROUTINE_POLICY.check_object(&ctx.identity, Action::Delete, existing.owner_id)?;

        repo.delete_routine(id)?;
        info!(
            "event=routine_delete module=handler status=ok routine_id={id} identity={}",
            ctx.identity.log_label()
        );
        Ok(())
    }
}
