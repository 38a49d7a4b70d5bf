//! Snippet handler.
//!
//! Reads (including the highlight action) are open to anonymous callers;
//! writes need an authenticated owner. The stored highlighted document is
//! re-rendered on every write.

use super::{
    acting_user_id, update_mode, HandlerError, HandlerResult, RequestContext, ResourceHandler,
};
use crate::model::snippet::{Snippet, SnippetId};
use crate::policy::{Action, SNIPPET_POLICY};
use crate::projection::snippet::{read_snippet_create, read_snippet_update, SnippetView};
use crate::repo::snippet_repo::{SnippetListQuery, SnippetRepository, SqliteSnippetRepository};
use log::info;
use serde_json::Value;

#[derive(Debug, Default, Clone, Copy)]
pub struct SnippetHandler;

impl SnippetHandler {
    fn load(repo: &SqliteSnippetRepository<'_>, id: SnippetId) -> HandlerResult<Snippet> {
        repo.get_snippet(id)?.ok_or(HandlerError::NotFound {
            resource: "snippet",
            id,
        })
    }

    /// Returns the stored highlighted HTML document of snippet `id`.
    pub fn highlight(&self, ctx: &RequestContext<'_>, id: SnippetId) -> HandlerResult<String> {
        SNIPPET_POLICY.check_collection(&ctx.identity, Action::Retrieve)?;
        let repo = SqliteSnippetRepository::try_new(ctx.store)?;
        let snippet = Self::load(&repo, id)?;
        SNIPPET_POLICY.check_object(&ctx.identity, Action::Retrieve, snippet.owner_id)?;
        Ok(snippet.highlighted)
    }
}

impl ResourceHandler for SnippetHandler {
    type View = SnippetView;

    fn list(&self, ctx: &RequestContext<'_>) -> HandlerResult<Vec<SnippetView>> {
        SNIPPET_POLICY.check_collection(&ctx.identity, Action::List)?;
        let repo = SqliteSnippetRepository::try_new(ctx.store)?;
        Ok(repo
            .list_snippets(&SnippetListQuery::default())?
            .iter()
            .map(|snippet| SnippetView::project(snippet, ctx.links))
            .collect())
    }

    fn get(&self, ctx: &RequestContext<'_>, id: SnippetId) -> HandlerResult<SnippetView> {
        SNIPPET_POLICY.check_collection(&ctx.identity, Action::Retrieve)?;
        let repo = SqliteSnippetRepository::try_new(ctx.store)?;
        let snippet = Self::load(&repo, id)?;
        SNIPPET_POLICY.check_object(&ctx.identity, Action::Retrieve, snippet.owner_id)?;
        Ok(SnippetView::project(&snippet, ctx.links))
    }

    fn create(&self, ctx: &RequestContext<'_>, payload: &Value) -> HandlerResult<SnippetView> {
        SNIPPET_POLICY.check_collection(&ctx.identity, Action::Create)?;
        let mut draft = read_snippet_create(payload, acting_user_id(ctx)?)?;
        draft.refresh_highlighted()?;

        let repo = SqliteSnippetRepository::try_new(ctx.store)?;
        let id = repo.create_snippet(&draft)?;
        info!(
            "event=snippet_create module=handler status=ok snippet_id={id} language={} linenos={} identity={}",
            draft.language,
            draft.linenos,
            ctx.identity.log_label()
        );
        Ok(SnippetView::project(&Self::load(&repo, id)?, ctx.links))
    }

    fn update(
        &self,
        ctx: &RequestContext<'_>,
        id: SnippetId,
        payload: &Value,
        partial: bool,
    ) -> HandlerResult<SnippetView> {
        SNIPPET_POLICY.check_collection(&ctx.identity, Action::Update)?;
        let repo = SqliteSnippetRepository::try_new(ctx.store)?;
        let existing = Self::load(&repo, id)?;
        SNIPPET_POLICY.check_object(&ctx.identity, Action::Update, existing.owner_id)?;

        let mut snippet = read_snippet_update(payload, update_mode(partial), &existing)?;
        snippet.refresh_highlighted()?;
        repo.update_snippet(&snippet)?;
        info!(
            "event=snippet_update module=handler status=ok snippet_id={id} partial={partial} identity={}",
            ctx.identity.log_label()
        );
        Ok(SnippetView::project(&snippet, ctx.links))
    }

    fn delete(&self, ctx: &RequestContext<'_>, id: SnippetId) -> HandlerResult<()> {
        SNIPPET_POLICY.check_collection(&ctx.identity, Action::Delete)?;
        let repo = SqliteSnippetRepository::try_new(ctx.store)?;
        let existing = Self::load(&repo, id)?;
        SNIPPET_POLICY.check_object(&ctx.identity, Action::Delete, existing.owner_id)?;

        repo.delete_snippet(id)?;
        info!(
            "event=snippet_delete module=handler status=ok snippet_id={id} identity={}",
            ctx.identity.log_label()
        );
        Ok(())
    }
}
