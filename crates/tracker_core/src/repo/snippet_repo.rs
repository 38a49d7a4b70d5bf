//! Snippet repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `highlighted` is persisted exactly as provided; callers refresh it.
//! - Update paths never rewrite `owner_id` or `created`.
//! - Listing order is `created ASC, id ASC`.

use super::{bool_to_int, ensure_connection_ready, int_to_bool, RepoError, RepoResult};
use crate::model::snippet::{NewSnippet, Snippet, SnippetId};
use crate::model::user::UserId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const SNIPPET_SELECT_SQL: &str = "SELECT
    s.id,
    s.created,
    s.title,
    s.code,
    s.linenos,
    s.language,
    s.style,
    s.highlighted,
    s.owner_id,
    u.username AS owner_username
FROM snippets s
JOIN users u ON u.id = s.owner_id";

/// Query options for listing snippets.
#[derive(Debug, Clone, Default)]
pub struct SnippetListQuery {
    /// Restricts results to snippets owned by this user.
    pub owner_id: Option<UserId>,
}

/// Repository interface for snippet CRUD operations.
pub trait SnippetRepository {
    fn create_snippet(&self, snippet: &NewSnippet) -> RepoResult<SnippetId>;
    fn update_snippet(&self, snippet: &Snippet) -> RepoResult<()>;
    fn get_snippet(&self, id: SnippetId) -> RepoResult<Option<Snippet>>;
    fn list_snippets(&self, query: &SnippetListQuery) -> RepoResult<Vec<Snippet>>;
    fn delete_snippet(&self, id: SnippetId) -> RepoResult<()>;
}

/// SQLite-backed snippet repository.
pub struct SqliteSnippetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnippetRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "snippets",
            &[
                "id",
                "created",
                "title",
                "code",
                "linenos",
                "language",
                "style",
                "highlighted",
                "owner_id",
            ],
        )?;
        Ok(Self { conn })
    }

    /// Ids of the snippets owned by `owner_id`, in listing order.
    pub fn snippet_ids_for_owner(&self, owner_id: UserId) -> RepoResult<Vec<SnippetId>> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM snippets WHERE owner_id = ?1 ORDER BY created ASC, id ASC;",
        )?;
        let ids = stmt
            .query_map([owner_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}

impl SnippetRepository for SqliteSnippetRepository<'_> {
    fn create_snippet(&self, snippet: &NewSnippet) -> RepoResult<SnippetId> {
        snippet.validate()?;

        self.conn.execute(
            "INSERT INTO snippets (
                title,
                code,
                linenos,
                language,
                style,
                highlighted,
                owner_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                snippet.title.as_str(),
                snippet.code.as_str(),
                bool_to_int(snippet.linenos),
                snippet.language.as_str(),
                snippet.style.as_str(),
                snippet.highlighted.as_str(),
                snippet.owner_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_snippet(&self, snippet: &Snippet) -> RepoResult<()> {
        snippet.validate()?;

        let changed = self.conn.execute(
            "UPDATE snippets
             SET
                title = ?1,
                code = ?2,
                linenos = ?3,
                language = ?4,
                style = ?5,
                highlighted = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?7;",
            params![
                snippet.title.as_str(),
                snippet.code.as_str(),
                bool_to_int(snippet.linenos),
                snippet.language.as_str(),
                snippet.style.as_str(),
                snippet.highlighted.as_str(),
                snippet.id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "snippet",
                id: snippet.id,
            });
        }
        Ok(())
    }

    fn get_snippet(&self, id: SnippetId) -> RepoResult<Option<Snippet>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SNIPPET_SELECT_SQL} WHERE s.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_snippet_row(row)?));
        }
        Ok(None)
    }

    fn list_snippets(&self, query: &SnippetListQuery) -> RepoResult<Vec<Snippet>> {
        let mut sql = format!("{SNIPPET_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner_id) = query.owner_id {
            sql.push_str(" AND s.owner_id = ?");
            bind_values.push(Value::Integer(owner_id));
        }
        sql.push_str(" ORDER BY s.created ASC, s.id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut snippets = Vec::new();
        while let Some(row) = rows.next()? {
            snippets.push(parse_snippet_row(row)?);
        }
        Ok(snippets)
    }

    fn delete_snippet(&self, id: SnippetId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM snippets WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "snippet",
                id,
            });
        }
        Ok(())
    }
}

fn parse_snippet_row(row: &Row<'_>) -> RepoResult<Snippet> {
    Ok(Snippet {
        id: row.get("id")?,
        created: row.get("created")?,
        title: row.get("title")?,
        code: row.get("code")?,
        linenos: int_to_bool(row.get("linenos")?, "snippets.linenos")?,
        language: row.get("language")?,
        style: row.get("style")?,
        owner_id: row.get("owner_id")?,
        owner_username: row.get("owner_username")?,
        highlighted: row.get("highlighted")?,
    })
}
