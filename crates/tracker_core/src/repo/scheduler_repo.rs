//! Scheduler repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `timing`/`day` are stored as their lowercase wire names.
//! - `time` is stored as `HH:MM:SS` text.
//! - Read paths reject invalid persisted values instead of masking them.

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::scheduler::{
    format_time, parse_time, Day, NewScheduler, Scheduler, SchedulerId, Timing,
};
use crate::model::task::TaskId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const SCHEDULER_SELECT_SQL: &str = "SELECT id, timing, day, time, task_id FROM schedulers";

/// Query options for listing schedulers.
#[derive(Debug, Clone, Default)]
pub struct SchedulerListQuery {
    pub task_id: Option<TaskId>,
}

/// Repository interface for scheduler CRUD operations.
pub trait SchedulerRepository {
    fn create_scheduler(&self, scheduler: &NewScheduler) -> RepoResult<SchedulerId>;
    fn update_scheduler(&self, scheduler: &Scheduler) -> RepoResult<()>;
    fn get_scheduler(&self, id: SchedulerId) -> RepoResult<Option<Scheduler>>;
    fn list_schedulers(&self, query: &SchedulerListQuery) -> RepoResult<Vec<Scheduler>>;
    fn delete_scheduler(&self, id: SchedulerId) -> RepoResult<()>;
}

/// SQLite-backed scheduler repository.
pub struct SqliteSchedulerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSchedulerRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "schedulers",
            &["id", "timing", "day", "time", "task_id"],
        )?;
        Ok(Self { conn })
    }
}

impl SchedulerRepository for SqliteSchedulerRepository<'_> {
    fn create_scheduler(&self, scheduler: &NewScheduler) -> RepoResult<SchedulerId> {
        scheduler.validate()?;

        self.conn.execute(
            "INSERT INTO schedulers (timing, day, time, task_id) VALUES (?1, ?2, ?3, ?4);",
            params![
                scheduler.timing.as_str(),
                scheduler.day.map(Day::as_str),
                format_time(scheduler.time),
                scheduler.task_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_scheduler(&self, scheduler: &Scheduler) -> RepoResult<()> {
        scheduler.validate()?;

        let changed = self.conn.execute(
            "UPDATE schedulers
             SET
                timing = ?1,
                day = ?2,
                time = ?3,
                task_id = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?5;",
            params![
                scheduler.timing.as_str(),
                scheduler.day.map(Day::as_str),
                format_time(scheduler.time),
                scheduler.task_id,
                scheduler.id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "scheduler",
                id: scheduler.id,
            });
        }
        Ok(())
    }

    fn get_scheduler(&self, id: SchedulerId) -> RepoResult<Option<Scheduler>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SCHEDULER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_scheduler_row(row)?));
        }
        Ok(None)
    }

    fn list_schedulers(&self, query: &SchedulerListQuery) -> RepoResult<Vec<Scheduler>> {
        let mut sql = format!("{SCHEDULER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(task_id) = query.task_id {
            sql.push_str(" AND task_id = ?");
            bind_values.push(Value::Integer(task_id));
        }
        sql.push_str(" ORDER BY id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut schedulers = Vec::new();
        while let Some(row) = rows.next()? {
            schedulers.push(parse_scheduler_row(row)?);
        }
        Ok(schedulers)
    }

    fn delete_scheduler(&self, id: SchedulerId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM schedulers WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "scheduler",
                id,
            });
        }
        Ok(())
    }
}

fn parse_scheduler_row(row: &Row<'_>) -> RepoResult<Scheduler> {
    let timing_text: String = row.get("timing")?;
    let timing = Timing::parse(&timing_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid timing `{timing_text}` in schedulers.timing"))
    })?;

    let day = match row.get::<_, Option<String>>("day")? {
        Some(value) => Some(Day::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid day `{value}` in schedulers.day"))
        })?),
        None => None,
    };

    let time_text: String = row.get("time")?;
    let time = parse_time(&time_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid time `{time_text}` in schedulers.time"))
    })?;

    let scheduler = Scheduler {
        id: row.get("id")?,
        timing,
        day,
        time,
        task_id: row.get("task_id")?,
    };
    scheduler.validate()?;
    Ok(scheduler)
}
