//! User projection.
//!
//! Read: `url`, `id`, `username`, `snippets`. Write: `username`.

use super::{required, LinkBuilder, PayloadReader, ValidationErrors, WriteMode};
use crate::model::snippet::SnippetId;
use crate::model::user::{validate_username, User, UserId};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub url: String,
    pub id: UserId,
    pub username: String,
    /// Snippet detail URLs; read-only.
    pub snippets: Vec<String>,
}

impl UserView {
    pub fn project(user: &User, snippet_ids: &[SnippetId], links: &LinkBuilder) -> Self {
        Self {
            url: links.detail("users", user.id),
            id: user.id,
            username: user.username.clone(),
            snippets: snippet_ids
                .iter()
                .map(|snippet_id| links.detail("snippets", *snippet_id))
                .collect(),
        }
    }
}

/// Returns the requested username of a create payload.
pub fn read_user_create(payload: &Value) -> Result<String, ValidationErrors> {
    let mut reader = PayloadReader::new(payload, WriteMode::Create)?;
    let username = reader.text("username", true);
    if let Some(username) = &username {
        reader.check(validate_username(username));
    }
    reader.finish()?;
    required("username", username)
}

pub fn read_user_update(
    payload: &Value,
    mode: WriteMode,
    existing: &User,
) -> Result<User, ValidationErrors> {
    let mut reader = PayloadReader::new(payload, mode)?;
    let mut user = existing.clone();
    if let Some(username) = reader.text("username", true) {
        reader.check(validate_username(&username));
        user.username = username;
    }
    reader.finish()?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::{read_user_create, UserView};
    use crate::model::user::User;
    use crate::projection::LinkBuilder;
    use serde_json::json;

    #[test]
    fn view_lists_snippet_links() {
        let view = UserView::project(&User::new(2, "bob"), &[5, 9], &LinkBuilder::default());
        assert_eq!(view.snippets, vec!["/snippets/5", "/snippets/9"]);
        assert_eq!(view.url, "/users/2");
    }

    #[test]
    fn create_validates_username_charset() {
        assert_eq!(read_user_create(&json!({"username": "bob"})).unwrap(), "bob");
        let err = read_user_create(&json!({"username": "bob smith", "snippets": []})).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["username"]);
    }
}
