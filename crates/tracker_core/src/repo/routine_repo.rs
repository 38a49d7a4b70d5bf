//! Routine repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Update paths never rewrite `owner_id`.
//! - Reads resolve the owner's username through a join on `users`.

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::routine::{NewRoutine, Routine, RoutineId};
use crate::model::user::UserId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const ROUTINE_SELECT_SQL: &str = "SELECT
    r.id,
    r.title,
    r.owner_id,
    u.username
FROM routines r
JOIN users u ON u.id = r.owner_id";

/// Query options for listing routines.
#[derive(Debug, Clone, Default)]
pub struct RoutineListQuery {
    /// Restricts results to routines owned by this user.
    pub owner_id: Option<UserId>,
}

/// Repository interface for routine CRUD operations.
pub trait RoutineRepository {
    fn create_routine(&self, routine: &NewRoutine) -> RepoResult<RoutineId>;
    fn update_routine(&self, routine: &Routine) -> RepoResult<()>;
    fn get_routine(&self, id: RoutineId) -> RepoResult<Option<Routine>>;
    fn list_routines(&self, query: &RoutineListQuery) -> RepoResult<Vec<Routine>>;
    fn delete_routine(&self, id: RoutineId) -> RepoResult<()>;
}

/// SQLite-backed routine repository.
pub struct SqliteRoutineRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRoutineRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "routines", &["id", "title", "owner_id"])?;
        Ok(Self { conn })
    }
}

impl RoutineRepository for SqliteRoutineRepository<'_> {
    fn create_routine(&self, routine: &NewRoutine) -> RepoResult<RoutineId> {
        routine.validate()?;

        self.conn.execute(
            "INSERT INTO routines (title, owner_id) VALUES (?1, ?2);",
            params![routine.title.as_str(), routine.owner_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_routine(&self, routine: &Routine) -> RepoResult<()> {
        routine.validate()?;

        let changed = self.conn.execute(
            "UPDATE routines
             SET
                title = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![routine.title.as_str(), routine.id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "routine",
                id: routine.id,
            });
        }
        Ok(())
    }

    fn get_routine(&self, id: RoutineId) -> RepoResult<Option<Routine>> {
        Ok(self
            .conn
            .query_row(
                &format!("{ROUTINE_SELECT_SQL} WHERE r.id = ?1;"),
                [id],
                parse_routine_row,
            )
            .optional()?)
    }

    fn list_routines(&self, query: &RoutineListQuery) -> RepoResult<Vec<Routine>> {
        let mut sql = format!("{ROUTINE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner_id) = query.owner_id {
            sql.push_str(" AND r.owner_id = ?");
            bind_values.push(Value::Integer(owner_id));
        }
        sql.push_str(" ORDER BY r.id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let routines = stmt
            .query_map(params_from_iter(bind_values), parse_routine_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(routines)
    }

    fn delete_routine(&self, id: RoutineId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM routines WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "routine",
                id,
            });
        }
        Ok(())
    }
}

fn parse_routine_row(row: &Row<'_>) -> rusqlite::Result<Routine> {
    Ok(Routine {
        id: row.get(0)?,
        title: row.get(1)?,
        owner_id: row.get(2)?,
        owner_username: row.get(3)?,
    })
}
