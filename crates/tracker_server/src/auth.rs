//! Resolves the acting identity from an `Authorization` header.
//!
//! Accepted forms are `Token <key>` and `Bearer <key>`. A missing header, or
//! one using another scheme, yields the anonymous identity.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use tracker_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use tracker_core::{Identity, RepoError};

const SCHEMES: [&str; 2] = ["token", "bearer"];

#[derive(Debug)]
pub enum AuthError {
    /// Recognized scheme without a usable key.
    MalformedHeader,
    /// Key does not belong to any user.
    InvalidToken,
    Store(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedHeader => write!(f, "Invalid token header. No credentials provided."),
            Self::InvalidToken => write!(f, "Invalid token."),
            Self::Store(err) => write!(f, "token lookup failed: {err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

pub fn resolve_identity(
    conn: &Connection,
    authorization: Option<&str>,
) -> Result<Identity, AuthError> {
    let Some(header) = authorization else {
        return Ok(Identity::Anonymous);
    };
    let mut parts = header.split_whitespace();
    let Some(scheme) = parts.next() else {
        return Ok(Identity::Anonymous);
    };
    if !SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
        return Ok(Identity::Anonymous);
    }
    let key = match (parts.next(), parts.next()) {
        (Some(key), None) => key,
        _ => return Err(AuthError::MalformedHeader),
    };

    let repo = SqliteUserRepository::try_new(conn)?;
    match repo.user_for_token(key)? {
        Some(user) => Ok(Identity::user(user.id, user.username)),
        None => Err(AuthError::InvalidToken),
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_identity, AuthError};
    use tracker_core::repo::user_repo::{SqliteUserRepository, UserRepository};
    use tracker_core::{open_db_in_memory, Identity};

    #[test]
    fn resolves_token_and_bearer_schemes() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteUserRepository::try_new(&conn).unwrap();
        let alice = repo.create_user("alice").unwrap();
        let key = repo.issue_token(alice.id).unwrap();

        let expected = Identity::user(alice.id, "alice");
        let header = format!("Token {key}");
        assert_eq!(resolve_identity(&conn, Some(&header)).unwrap(), expected);
        let header = format!("bearer {key}");
        assert_eq!(resolve_identity(&conn, Some(&header)).unwrap(), expected);
    }

    #[test]
    fn missing_or_foreign_scheme_is_anonymous() {
        let conn = open_db_in_memory().unwrap();
        assert_eq!(resolve_identity(&conn, None).unwrap(), Identity::Anonymous);
        assert_eq!(
            resolve_identity(&conn, Some("Basic YWxpY2U6cHc=")).unwrap(),
            Identity::Anonymous
        );
    }

    #[test]
    fn unknown_or_malformed_tokens_are_rejected() {
        let conn = open_db_in_memory().unwrap();
        assert!(matches!(
            resolve_identity(&conn, Some("Token nope")),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            resolve_identity(&conn, Some("Token")),
            Err(AuthError::MalformedHeader)
        ));
        assert!(matches!(
            resolve_identity(&conn, Some("Token a b")),
            Err(AuthError::MalformedHeader)
        ));
    }
}
