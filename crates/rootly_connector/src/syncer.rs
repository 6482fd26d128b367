//! The per-kind sync surface exposed to the host.

use crate::error::ConnectorResult;
use rootly_model::{Entitlement, Grant, Resource, ResourceId, ResourceType};

/// One page of results plus the token of the next page.
///
/// An empty `next_token` means the listing is complete.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Token to pass back for the next page; empty when done.
    pub next_token: String,
}

impl<T> Listing<T> {
    /// Creates a page with a continuation token.
    pub fn new(items: Vec<T>, next_token: impl Into<String>) -> Self {
        Self {
            items,
            next_token: next_token.into(),
        }
    }

    /// Creates the final page.
    pub fn done(items: Vec<T>) -> Self {
        Self::new(items, String::new())
    }

    /// Returns true if more pages follow.
    pub fn has_more(&self) -> bool {
        !self.next_token.is_empty()
    }
}

/// Lists resources, entitlements and grants for one resource type.
///
/// Every call is self-contained: the page token is the only state carried
/// between calls, and a failed call leaves the caller's token valid.
pub trait ResourceSyncer: Send + Sync {
    /// Returns the resource type this syncer handles.
    fn resource_type(&self) -> &'static ResourceType;

    /// Lists one page of resources.
    fn list(&self, parent: Option<&ResourceId>, token: &str) -> ConnectorResult<Listing<Resource>>;

    /// Lists the entitlements of a resource.
    fn entitlements(&self, resource: &Resource, token: &str)
        -> ConnectorResult<Listing<Entitlement>>;

    /// Lists one page of grants on a resource.
    fn grants(&self, resource: &Resource, token: &str) -> ConnectorResult<Listing<Grant>>;
}
