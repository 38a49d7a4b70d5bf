//! Snippet syntax highlighting.
//!
//! # Responsibility
//! - Resolve snippet `language`/`style` values against the bundled syntect
//!   syntax and theme sets.
//! - Render snippet code into a standalone HTML document.
//!
//! # Invariants
//! - Syntax and theme sets are loaded once per process.
//! - Rendered documents escape every user-supplied string.

use once_cell::sync::Lazy;
use std::error::Error;
use std::fmt::{Display, Formatter};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::html::{
    append_highlighted_html_for_styled_line, start_highlighted_html_snippet, IncludeBackground,
};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

pub const DEFAULT_LANGUAGE: &str = "python";
pub const DEFAULT_STYLE: &str = "InspiredGitHub";

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Input of one highlight pass.
#[derive(Debug, Clone, Copy)]
pub struct HighlightRequest<'a> {
    pub code: &'a str,
    pub language: &'a str,
    pub style: &'a str,
    pub linenos: bool,
    pub title: &'a str,
}

#[derive(Debug)]
pub enum HighlightError {
    UnknownLanguage(String),
    UnknownStyle(String),
    Render(syntect::Error),
}

impl Display for HighlightError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLanguage(value) => write!(f, "unknown snippet language: {value}"),
            Self::UnknownStyle(value) => write!(f, "unknown snippet style: {value}"),
            Self::Render(err) => write!(f, "highlight rendering failed: {err}"),
        }
    }
}

impl Error for HighlightError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Render(err) => Some(err),
            _ => None,
        }
    }
}

impl From<syntect::Error> for HighlightError {
    fn from(value: syntect::Error) -> Self {
        Self::Render(value)
    }
}

/// Whether `language` resolves to a bundled syntax (by extension or name).
pub fn is_known_language(language: &str) -> bool {
    !language.is_empty() && SYNTAX_SET.find_syntax_by_token(language).is_some()
}

/// Whether `style` names a bundled theme. Theme names are case-sensitive.
pub fn is_known_style(style: &str) -> bool {
    THEME_SET.themes.contains_key(style)
}

/// Renders `request.code` as a complete HTML document.
///
/// The document carries `title` in `<title>` and as a heading when
/// non-empty, and prefixes each line with its number when `linenos` is set.
pub fn render_document(request: &HighlightRequest<'_>) -> Result<String, HighlightError> {
    let syntax = SYNTAX_SET
        .find_syntax_by_token(request.language)
        .ok_or_else(|| HighlightError::UnknownLanguage(request.language.to_string()))?;
    let theme = THEME_SET
        .themes
        .get(request.style)
        .ok_or_else(|| HighlightError::UnknownStyle(request.style.to_string()))?;

    let (mut body, background) = start_highlighted_html_snippet(theme);
    let mut highlighter = HighlightLines::new(syntax, theme);
    let line_count = LinesWithEndings::from(request.code).count();
    let number_width = line_count.to_string().len();

    for (index, line) in LinesWithEndings::from(request.code).enumerate() {
        if request.linenos {
            body.push_str(&format!(
                "<span class=\"lineno\">{:>width$} </span>",
                index + 1,
                width = number_width
            ));
        }
        let regions = highlighter.highlight_line(line, &SYNTAX_SET)?;
        append_highlighted_html_for_styled_line(
            &regions[..],
            IncludeBackground::IfDifferent(background),
            &mut body,
        )?;
    }
    body.push_str("</pre>\n");

    let title = escape_html(request.title);
    let heading = if title.is_empty() {
        String::new()
    } else {
        format!("<h2>{title}</h2>\n")
    };

    Ok(format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <style>.lineno {{ color: #8a8a8a; user-select: none; }}</style>\n\
         </head>\n\
         <body>\n\
         {heading}{body}\
         </body>\n\
         </html>\n"
    ))
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{
        escape_html, is_known_language, is_known_style, render_document, HighlightError,
        HighlightRequest, DEFAULT_LANGUAGE, DEFAULT_STYLE,
    };

    fn request<'a>(code: &'a str, linenos: bool, title: &'a str) -> HighlightRequest<'a> {
        HighlightRequest {
            code,
            language: DEFAULT_LANGUAGE,
            style: DEFAULT_STYLE,
            linenos,
            title,
        }
    }

    #[test]
    fn resolves_languages_by_name_and_extension() {
        assert!(is_known_language("python"));
        assert!(is_known_language("py"));
        assert!(is_known_language("rs"));
        assert!(!is_known_language("klingon"));
        assert!(!is_known_language(""));
    }

    #[test]
    fn styles_are_exact_theme_names() {
        assert!(is_known_style(DEFAULT_STYLE));
        assert!(is_known_style("base16-ocean.dark"));
        assert!(!is_known_style("inspiredgithub"));
    }

    #[test]
    fn renders_full_document_with_title() {
        let html = render_document(&request("print('hi')\n", false, "Greeting")).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Greeting</title>"));
        assert!(html.contains("<h2>Greeting</h2>"));
        assert!(html.contains("<pre"));
        assert!(html.contains("print"));
        assert!(!html.contains("class=\"lineno\""));
    }

    #[test]
    fn renders_line_numbers_when_enabled() {
        let code = "a = 1\nb = 2\nc = 3\n";
        let html = render_document(&request(code, true, "")).unwrap();
        assert_eq!(html.matches("class=\"lineno\"").count(), 3);
        assert!(!html.contains("<h2>"));
    }

    #[test]
    fn escapes_title_markup() {
        let html = render_document(&request("x\n", false, "<script>")).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert_eq!(escape_html("a&\"'"), "a&amp;&quot;&#x27;");
    }

    #[test]
    fn rejects_unknown_language_and_style() {
        let mut bad_language = request("x", false, "");
        bad_language.language = "klingon";
        assert!(matches!(
            render_document(&bad_language),
            Err(HighlightError::UnknownLanguage(_))
        ));

        let mut bad_style = request("x", false, "");
        bad_style.style = "neon";
        assert!(matches!(
            render_document(&bad_style),
            Err(HighlightError::UnknownStyle(_))
        ));
    }
}
