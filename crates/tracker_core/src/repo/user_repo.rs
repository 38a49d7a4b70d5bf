//! User repository contracts and SQLite implementation.
//!
//! Also owns the `auth_tokens` table, which maps opaque API tokens to users
//! for the authentication collaborator.

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::user::{validate_username, User, UserId};
use crate::model::first_violation;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT id, username FROM users";

/// Repository interface for user records and their API tokens.
pub trait UserRepository {
    fn create_user(&self, username: &str) -> RepoResult<User>;
    fn update_user(&self, user: &User) -> RepoResult<()>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    fn list_users(&self) -> RepoResult<Vec<User>>;
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
    /// Returns the user's token, creating one on first use.
    fn issue_token(&self, id: UserId) -> RepoResult<String>;
    fn user_for_token(&self, token: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "users", &["id", "username"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, username: &str) -> RepoResult<User> {
        first_violation(validate_username(username))?;

        self.conn
            .execute("INSERT INTO users (username) VALUES (?1);", [username])?;
        Ok(User::new(self.conn.last_insert_rowid(), username))
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;

        let changed = self.conn.execute(
            "UPDATE users SET username = ?1 WHERE id = ?2;",
            params![user.username.as_str(), user.id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user",
                id: user.id,
            });
        }
        Ok(())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_user_row,
            )
            .optional()?)
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE username = ?1;"),
                [username],
                parse_user_row,
            )
            .optional()?)
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"))?;
        let users = stmt
            .query_map([], parse_user_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }
        Ok(())
    }

    fn issue_token(&self, id: UserId) -> RepoResult<String> {
        if self.get_user(id)?.is_none() {
            return Err(RepoError::NotFound { entity: "user", id });
        }

        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT token FROM auth_tokens WHERE user_id = ?1;",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(token) = existing {
            return Ok(token);
        }

        let token = Uuid::new_v4().simple().to_string();
        self.conn.execute(
            "INSERT INTO auth_tokens (token, user_id) VALUES (?1, ?2);",
            params![token.as_str(), id],
        )?;
        Ok(token)
    }

    fn user_for_token(&self, token: &str) -> RepoResult<Option<User>> {
        if token.is_empty() {
            return Ok(None);
        }
        Ok(self
            .conn
            .query_row(
                "SELECT u.id, u.username
                 FROM auth_tokens t
                 JOIN users u ON u.id = t.user_id
                 WHERE t.token = ?1;",
                [token],
                parse_user_row,
            )
            .optional()?)
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
    })
}
