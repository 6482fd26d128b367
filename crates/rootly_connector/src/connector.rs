//! Connector entry point.

use crate::error::{ConnectorError, ConnectorResult};
use crate::schedules::{Clock, ScheduleSyncer};
use crate::secrets::SecretSyncer;
use crate::syncer::ResourceSyncer;
use crate::teams::TeamSyncer;
use crate::users::UserSyncer;
use rootly_client::UpstreamClient;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Descriptive metadata about the connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorMetadata {
    /// Display name.
    pub display_name: String,
    /// Description.
    pub description: String,
}

/// The Rootly connector.
///
/// Owns the upstream client and hands out one syncer per resource type.
pub struct Connector<U: UpstreamClient> {
    client: Arc<U>,
    clock: Option<Clock>,
}

impl<U: UpstreamClient + 'static> Connector<U> {
    /// Creates a connector.
    pub fn new(client: U) -> Self {
        Self::from_arc(Arc::new(client))
    }

    /// Creates a connector sharing an existing client.
    pub fn from_arc(client: Arc<U>) -> Self {
        Self {
            client,
            clock: None,
        }
    }

    /// Overrides the clock used for on-call lookups.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Returns the upstream client.
    pub fn client(&self) -> &Arc<U> {
        &self.client
    }

    /// Returns the connector metadata.
    pub fn metadata(&self) -> ConnectorMetadata {
        ConnectorMetadata {
            display_name: "Rootly Connector".to_string(),
            description: "Syncs Rootly users, teams, secrets and on-call schedules".to_string(),
        }
    }

    /// Checks that the configured credentials can read from Rootly.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::Validation` if the first page of users
    /// cannot be fetched.
    pub fn validate(&self) -> ConnectorResult<()> {
        debug!("validating credentials");
        self.client
            .list_users("")
            .map_err(|source| ConnectorError::Validation { source })?;
        info!("credentials validated");
        Ok(())
    }

    /// Returns one syncer per resource type, in sync order.
    pub fn resource_syncers(&self) -> Vec<Box<dyn ResourceSyncer>> {
        let mut schedules = ScheduleSyncer::new(Arc::clone(&self.client));
        if let Some(clock) = self.clock {
            schedules = schedules.with_clock(clock);
        }

        vec![
            Box::new(UserSyncer::new(Arc::clone(&self.client))),
            Box::new(TeamSyncer::new(Arc::clone(&self.client))),
            Box::new(SecretSyncer::new(Arc::clone(&self.client))),
            Box::new(schedules),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootly_client::{ClientError, MockUpstream, Operation};
    use rootly_model::ResourceType;

    #[test]
    fn metadata() {
        let connector = Connector::new(MockUpstream::new());
        assert_eq!(connector.metadata().display_name, "Rootly Connector");
    }

    #[test]
    fn syncers_follow_catalog_order() {
        let connector = Connector::new(MockUpstream::new());
        let kinds: Vec<_> = connector
            .resource_syncers()
            .iter()
            .map(|s| s.resource_type().kind)
            .collect();
        let expected: Vec<_> = ResourceType::all().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn validate_lists_users() {
        let connector = Connector::new(MockUpstream::new());
        connector.validate().unwrap();
        assert_eq!(connector.client().call_count(Operation::ListUsers), 1);
    }

    #[test]
    fn validate_failure() {
        let connector = Connector::new(MockUpstream::new());
        connector
            .client()
            .fail_next(Operation::ListUsers, ClientError::status(401));
        assert!(matches!(
            connector.validate(),
            Err(ConnectorError::Validation { .. })
        ));
    }
}
