//! Request-scoped context handed to every handler call.

use crate::policy::Identity;
use crate::projection::LinkBuilder;
use rusqlite::Connection;

/// Acting identity, store handle and link builder of one request.
pub struct RequestContext<'a> {
    pub identity: Identity,
    pub store: &'a Connection,
    pub links: &'a LinkBuilder,
}

impl<'a> RequestContext<'a> {
    pub fn new(identity: Identity, store: &'a Connection, links: &'a LinkBuilder) -> Self {
        Self {
            identity,
            store,
            links,
        }
    }
}
