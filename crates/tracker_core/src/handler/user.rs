//! User handler. Each user record is owned by itself.

use super::{update_mode, HandlerError, HandlerResult, RequestContext, ResourceHandler};
use crate::model::user::{User, UserId};
use crate::policy::{Action, USER_POLICY};
use crate::projection::user::{read_user_create, read_user_update, UserView};
use crate::projection::ValidationErrors;
use crate::repo::snippet_repo::SqliteSnippetRepository;
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use log::info;
use serde_json::Value;

pub const DUPLICATE_USERNAME_MESSAGE: &str = "A user with that username already exists.";

#[derive(Debug, Default, Clone, Copy)]
pub struct UserHandler;

impl UserHandler {
    fn load(repo: &SqliteUserRepository<'_>, id: UserId) -> HandlerResult<User> {
        repo.get_user(id)?.ok_or(HandlerError::NotFound {
            resource: "user",
            id,
        })
    }

    fn view(ctx: &RequestContext<'_>, user: &User) -> HandlerResult<UserView> {
        let snippet_ids =
            SqliteSnippetRepository::try_new(ctx.store)?.snippet_ids_for_owner(user.id)?;
        Ok(UserView::project(user, &snippet_ids, ctx.links))
    }

    /// Rejects `username` when another user already holds it.
    fn ensure_unique(
        repo: &SqliteUserRepository<'_>,
        username: &str,
        current: Option<UserId>,
    ) -> HandlerResult<()> {
        match repo.find_by_username(username)? {
            Some(other) if Some(other.id) != current => Err(HandlerError::Validation(
                ValidationErrors::single("username", DUPLICATE_USERNAME_MESSAGE),
            )),
            _ => Ok(()),
        }
    }
}

impl ResourceHandler for UserHandler {
    type View = UserView;

    fn list(&self, ctx: &RequestContext<'_>) -> HandlerResult<Vec<UserView>> {
        USER_POLICY.check_collection(&ctx.identity, Action::List)?;
        let repo = SqliteUserRepository::try_new(ctx.store)?;
        repo.list_users()?
            .iter()
            .map(|user| Self::view(ctx, user))
            .collect()
    }

    fn get(&self, ctx: &RequestContext<'_>, id: UserId) -> HandlerResult<UserView> {
        USER_POLICY.check_collection(&ctx.identity, Action::Retrieve)?;
        let repo = SqliteUserRepository::try_new(ctx.store)?;
        let user = Self::load(&repo, id)?;
        USER_POLICY.check_object(&ctx.identity, Action::Retrieve, user.id)?;
        Self::view(ctx, &user)
    }

    fn create(&self, ctx: &RequestContext<'_>, payload: &Value) -> HandlerResult<UserView> {
        USER_POLICY.check_collection(&ctx.identity, Action::Create)?;
        let username = read_user_create(payload)?;
        let repo = SqliteUserRepository::try_new(ctx.store)?;
        Self::ensure_unique(&repo, &username, None)?;

        let user = repo.create_user(&username)?;
        info!(
            "event=user_create module=handler status=ok user_id={} identity={}",
            user.id,
            ctx.identity.log_label()
        );
        Self::view(ctx, &user)
    }

    fn update(
        &self,
        ctx: &RequestContext<'_>,
        id: UserId,
        payload: &Value,
        partial: bool,
    ) -> HandlerResult<UserView> {
        USER_POLICY.check_collection(&ctx.identity, Action::Update)?;
        let repo = SqliteUserRepository::try_new(ctx.store)?;
        let existing = Self::load(&repo, id)?;
        USER_POLICY.check_object(&ctx.identity, Action::Update, existing.id)?;

        let user = read_user_update(payload, update_mode(partial), &existing)?;
        Self::ensure_unique(&repo, &user.username, Some(id))?;
        repo.update_user(&user)?;
        info!(
            "event=user_update module=handler status=ok user_id={id} partial={partial} identity={}",
            ctx.identity.log_label()
        );
        Self::view(ctx, &user)
    }

    fn delete(&self, ctx: &RequestContext<'_>, id: UserId) -> HandlerResult<()> {
        USER_POLICY.check_collection(&ctx.identity, Action::Delete)?;
        let repo = SqliteUserRepository::try_new(ctx.store)?;
        let existing = Self::load(&repo, id)?;
        USER_POLICY.check_object(&ctx.identity, Action::Delete, existing.id)?;

        repo.delete_user(id)?;
        info!(
            "event=user_delete module=handler status=ok user_id={id} identity={}",
            ctx.identity.log_label()
        );
        Ok(())
    }
}
