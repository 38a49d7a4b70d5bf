//! Hyperlinks embedded in read views.

use crate::model::EntityId;

/// Builds resource URLs below a configured base.
///
/// An empty base yields root-relative links such as `/snippets/3`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkBuilder {
    base_url: String,
}

impl LinkBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn collection(&self, collection: &str) -> String {
        format!("{}/{collection}", self.base_url)
    }

    pub fn detail(&self, collection: &str, id: EntityId) -> String {
        format!("{}/{collection}/{id}", self.base_url)
    }

    pub fn snippet_highlight(&self, id: EntityId) -> String {
        format!("{}/snippets/{id}/highlight", self.base_url)
    }
}
