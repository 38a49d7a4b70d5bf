//! Snippet projection.
//!
//! Read: `url`, `id`, `highlight`, `owner`, `title`, `code`, `linenos`,
//! `language`, `style`. Write: `title`, `code`, `linenos`, `language`,
//! `style`. The stored `highlighted` document is not part of the JSON view;
//! it is served by the highlight action.

use super::{required, LinkBuilder, PayloadReader, ValidationErrors, WriteMode};
use crate::highlight::{DEFAULT_LANGUAGE, DEFAULT_STYLE};
use crate::model::snippet::{
    validate_snippet_code, validate_snippet_language, validate_snippet_style,
    validate_snippet_title, NewSnippet, Snippet, SnippetId,
};
use crate::model::user::UserId;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetView {
    pub url: String,
    pub id: SnippetId,
    /// Link to the rendered document.
    pub highlight: String,
    /// Owner's username; read-only.
    pub owner: String,
    pub title: String,
    pub code: String,
    pub linenos: bool,
    pub language: String,
    pub style: String,
}

impl SnippetView {
    pub fn project(snippet: &Snippet, links: &LinkBuilder) -> Self {
        Self {
            url: links.detail("snippets", snippet.id),
            id: snippet.id,
            highlight: links.snippet_highlight(snippet.id),
            owner: snippet.owner_username.clone(),
            title: snippet.title.clone(),
            code: snippet.code.clone(),
            linenos: snippet.linenos,
            language: snippet.language.clone(),
            style: snippet.style.clone(),
        }
    }
}

/// Selects the write fields of a create payload. `highlighted` is left empty
/// for the caller to render.
pub fn read_snippet_create(
    payload: &Value,
    owner_id: UserId,
) -> Result<NewSnippet, ValidationErrors> {
    let mut reader = PayloadReader::new(payload, WriteMode::Create)?;
    let fields = read_fields(&mut reader);
    reader.finish()?;

    Ok(NewSnippet {
        title: fields.title.unwrap_or_default(),
        code: required("code", fields.code)?,
        linenos: fields.linenos.unwrap_or(false),
        language: fields
            .language
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        style: fields.style.unwrap_or_else(|| DEFAULT_STYLE.to_string()),
        owner_id,
        highlighted: String::new(),
    })
}

/// Applies the write fields of an update payload onto `existing`.
pub fn read_snippet_update(
    payload: &Value,
    mode: WriteMode,
    existing: &Snippet,
) -> Result<Snippet, ValidationErrors> {
    let mut reader = PayloadReader::new(payload, mode)?;
    let fields = read_fields(&mut reader);
    reader.finish()?;

    let mut snippet = existing.clone();
    if let Some(title) = fields.title {
        snippet.title = title;
    }
    if let Some(code) = fields.code {
        snippet.code = code;
    }
    if let Some(linenos) = fields.linenos {
        snippet.linenos = linenos;
    }
    if let Some(language) = fields.language {
        snippet.language = language;
    }
    if let Some(style) = fields.style {
        snippet.style = style;
    }
    Ok(snippet)
}

#[derive(Debug, Default)]
struct SnippetFields {
    title: Option<String>,
    code: Option<String>,
    linenos: Option<bool>,
    language: Option<String>,
    style: Option<String>,
}

fn read_fields(reader: &mut PayloadReader<'_>) -> SnippetFields {
    let title = reader.text("title", false);
    if let Some(title) = &title {
        reader.check(validate_snippet_title(title));
    }
    let code = reader.text("code", true);
    if let Some(code) = &code {
        reader.check(validate_snippet_code(code));
    }
    let linenos = reader.boolean("linenos", false);
    let language = reader.text("language", false);
    if let Some(language) = &language {
        reader.check(validate_snippet_language(language));
    }
    let style = reader.text("style", false);
    if let Some(style) = &style {
        reader.check(validate_snippet_style(style));
    }

    SnippetFields {
        title,
        code,
        linenos,
        language,
        style,
    }
}

#[cfg(test)]
mod tests {
    use super::{read_snippet_create, read_snippet_update, SnippetView};
    use crate::highlight::{DEFAULT_LANGUAGE, DEFAULT_STYLE};
    use crate::model::snippet::Snippet;
    use crate::projection::{LinkBuilder, WriteMode};
    use serde_json::json;

    fn stored() -> Snippet {
        Snippet {
            id: 3,
            created: 1_700_000_000_000,
            title: "hello".to_string(),
            code: "print('hello')\n".to_string(),
            linenos: false,
            language: "python".to_string(),
            style: DEFAULT_STYLE.to_string(),
            owner_id: 1,
            owner_username: "alice".to_string(),
            highlighted: "<html></html>".to_string(),
        }
    }

    #[test]
    fn create_applies_defaults_and_ignores_owner() {
        let draft =
            read_snippet_create(&json!({"code": "x = 1\n", "owner": "mallory"}), 1).unwrap();
        assert_eq!(draft.owner_id, 1);
        assert_eq!(draft.title, "");
        assert!(!draft.linenos);
        assert_eq!(draft.language, DEFAULT_LANGUAGE);
        assert_eq!(draft.style, DEFAULT_STYLE);
    }

    #[test]
    fn create_enumerates_offending_fields() {
        let err = read_snippet_create(
            &json!({"linenos": 1, "language": "klingon", "style": "neon"}),
            1,
        )
        .unwrap_err();
        assert_eq!(
            err.fields().collect::<Vec<_>>(),
            vec!["code", "language", "linenos", "style"]
        );
    }

    #[test]
    fn partial_update_keeps_omitted_fields() {
        let updated =
            read_snippet_update(&json!({"linenos": true}), WriteMode::Partial, &stored()).unwrap();
        assert!(updated.linenos);
        assert_eq!(updated.code, stored().code);
        assert_eq!(updated.owner_id, 1);
    }

    #[test]
    fn replace_requires_code() {
        let err = read_snippet_update(&json!({"title": "t"}), WriteMode::Replace, &stored())
            .unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["code"]);
    }

    #[test]
    fn view_links_to_highlight_and_hides_rendering() {
        let value = serde_json::to_value(SnippetView::project(&stored(), &LinkBuilder::default()))
            .unwrap();
        assert_eq!(value["url"], "/snippets/3");
        assert_eq!(value["highlight"], "/snippets/3/highlight");
        assert_eq!(value["owner"], "alice");
        assert!(value.get("highlighted").is_none());
    }
}
