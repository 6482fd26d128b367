//! Secret syncer.

use crate::error::{ConnectorError, ConnectorResult};
use crate::profile::timestamp;
use crate::syncer::{Listing, ResourceSyncer};
use rootly_client::{Operation, Secret, UpstreamClient};
use rootly_model::{
    catalog, Entitlement, Grant, Resource, ResourceId, ResourceTrait, ResourceType, SecretTrait,
};
use std::sync::Arc;
use tracing::debug;

/// Lists Rootly secrets. Secrets carry no entitlements or grants.
pub struct SecretSyncer<U: UpstreamClient> {
    client: Arc<U>,
}

impl<U: UpstreamClient> SecretSyncer<U> {
    /// Creates a secret syncer.
    pub fn new(client: Arc<U>) -> Self {
        Self { client }
    }
}

fn secret_resource(secret: &Secret, parent: Option<&ResourceId>) -> Resource {
    let shape = ResourceTrait::Secret(SecretTrait {
        created_at: timestamp(&secret.created_at),
    });
    Resource::new(ResourceId::secret(&secret.id), &secret.name, shape).with_parent(parent.cloned())
}

impl<U: UpstreamClient> ResourceSyncer for SecretSyncer<U> {
    fn resource_type(&self) -> &'static ResourceType {
        &catalog::SECRET
    }

    fn list(&self, parent: Option<&ResourceId>, token: &str) -> ConnectorResult<Listing<Resource>> {
        debug!(resource_type = "secret", token, "listing resources");
        let page = self
            .client
            .list_secrets(token)
            .map_err(ConnectorError::upstream(Operation::ListSecrets))?;
        let resources = page.items.iter().map(|s| secret_resource(s, parent)).collect();
        Ok(Listing::new(resources, page.next_cursor))
    }

    fn entitlements(
        &self,
        _resource: &Resource,
        _token: &str,
    ) -> ConnectorResult<Listing<Entitlement>> {
        Ok(Listing::done(Vec::new()))
    }

    fn grants(&self, _resource: &Resource, _token: &str) -> ConnectorResult<Listing<Grant>> {
        Ok(Listing::done(Vec::new()))
    }
}
