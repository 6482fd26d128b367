//! Host loop that drives every syncer to completion.
//!
//! The driver plays the role of the sync host: it lists every resource,
//! then feeds each returned page token back until the token comes back
//! empty. It performs no retries of its own.

use crate::error::{ConnectorError, ConnectorResult};
use crate::syncer::{Listing, ResourceSyncer};
use parking_lot::RwLock;
use rootly_model::{Entitlement, Grant, Resource, ResourceType};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default maximum number of pages fetched for a single listing.
pub const DEFAULT_MAX_PAGES: usize = 100_000;

/// Everything collected by one sync run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    /// Synchronized resource types.
    pub resource_types: Vec<ResourceType>,
    /// All resources.
    pub resources: Vec<Resource>,
    /// All entitlements.
    pub entitlements: Vec<Entitlement>,
    /// All grants.
    pub grants: Vec<Grant>,
}

/// Counters for sync runs.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Number of completed runs.
    pub runs_completed: u64,
    /// Resources listed.
    pub resources: u64,
    /// Entitlements listed.
    pub entitlements: u64,
    /// Grants listed.
    pub grants: u64,
    /// Syncer calls made.
    pub calls: u64,
    /// Duration of the last run.
    pub last_duration: Option<Duration>,
    /// Last error message.
    pub last_error: Option<String>,
}

/// Drives syncers until every page token is exhausted.
pub struct SyncDriver {
    syncers: Vec<Box<dyn ResourceSyncer>>,
    max_pages: usize,
    stats: RwLock<SyncStats>,
}

impl SyncDriver {
    /// Creates a driver over the given syncers.
    pub fn new(syncers: Vec<Box<dyn ResourceSyncer>>) -> Self {
        Self {
            syncers,
            max_pages: DEFAULT_MAX_PAGES,
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Sets the maximum number of pages per listing.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Runs a full sync.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any syncer.
    pub fn run(&self) -> ConnectorResult<Snapshot> {
        let start = Instant::now();
        match self.collect() {
            Ok(snapshot) => {
                let elapsed = start.elapsed();
                {
                    let mut stats = self.stats.write();
                    stats.runs_completed += 1;
                    stats.resources += snapshot.resources.len() as u64;
                    stats.entitlements += snapshot.entitlements.len() as u64;
                    stats.grants += snapshot.grants.len() as u64;
                    stats.last_duration = Some(elapsed);
                    stats.last_error = None;
                }
                info!(
                    resources = snapshot.resources.len(),
                    entitlements = snapshot.entitlements.len(),
                    grants = snapshot.grants.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "sync finished"
                );
                Ok(snapshot)
            }
            Err(e) => {
                self.stats.write().last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn collect(&self) -> ConnectorResult<Snapshot> {
        let mut snapshot = Snapshot::default();

        for syncer in &self.syncers {
            let resource_type = syncer.resource_type();
            snapshot.resource_types.push(*resource_type);

            let resources = self.drain("resources", resource_type.id(), |token| {
                syncer.list(None, token)
            })?;
            info!(
                resource_type = resource_type.id(),
                count = resources.len(),
                "listed resources"
            );

            if !resource_type.skip_entitlements_and_grants() {
                for resource in &resources {
                    let label = resource.id.to_string();
                    snapshot.entitlements.extend(
                        self.drain("entitlements", &label, |token| {
                            syncer.entitlements(resource, token)
                        })?,
                    );
                    let grants =
                        self.drain("grants", &label, |token| syncer.grants(resource, token))?;
                    debug!(resource = %resource.id, count = grants.len(), "resolved grants");
                    snapshot.grants.extend(grants);
                }
            }

            snapshot.resources.extend(resources);
        }

        Ok(snapshot)
    }

    /// Feeds page tokens back into `call` until it returns an empty token.
    fn drain<T>(
        &self,
        what: &'static str,
        label: &str,
        mut call: impl FnMut(&str) -> ConnectorResult<Listing<T>>,
    ) -> ConnectorResult<Vec<T>> {
        let mut items = Vec::new();
        let mut token = String::new();

        for _ in 0..self.max_pages {
            let listing = call(&token)?;
            self.stats.write().calls += 1;
            items.extend(listing.items);
            if listing.next_token.is_empty() {
                return Ok(items);
            }
            token = listing.next_token;
        }

        Err(ConnectorError::PageLimitExceeded {
            what,
            resource: label.to_string(),
            limit: self.max_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::Connector;
    use rootly_client::{ClientError, MockUpstream, Operation, Schedule, Team, User};
    use rootly_model::{ResourceId, ResourceTrait};
    use std::sync::Arc;

    /// Never stops paging.
    struct EndlessSyncer;

    impl ResourceSyncer for EndlessSyncer {
        fn resource_type(&self) -> &'static ResourceType {
            &rootly_model::catalog::SECRET
        }

        fn list(
            &self,
            _parent: Option<&ResourceId>,
            token: &str,
        ) -> ConnectorResult<Listing<Resource>> {
            Ok(Listing::new(Vec::new(), format!("{token}x")))
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

    fn upstream() -> MockUpstream {
        MockUpstream::new()
            .with_page_size(1)
            .with_user(User {
                id: "U1".into(),
                name: "ada".into(),
                ..User::default()
            })
            .with_user(User {
                id: "U2".into(),
                name: "grace".into(),
                ..User::default()
            })
            .with_team(Team {
                id: "T1".into(),
                name: "SRE".into(),
                member_ids: vec!["U1".into()],
                admin_ids: vec!["U2".into()],
                ..Team::default()
            })
            .with_schedule(Schedule {
                id: "S1".into(),
                name: "Primary".into(),
                owner_team_ids: vec!["T1".into()],
                ..Schedule::default()
            })
            .with_rotation_pages("S1", vec![vec!["R1", "R2"]])
            .with_member_pages("R1", vec![vec!["U1"]])
            .with_member_pages("R2", vec![vec!["U2"]])
    }

    #[test]
    fn collects_full_snapshot() {
        let connector = Connector::new(upstream());
        let driver = SyncDriver::new(connector.resource_syncers());
        let snapshot = driver.run().unwrap();

        assert_eq!(snapshot.resource_types.len(), 4);
        assert_eq!(snapshot.resources.len(), 4);
        assert_eq!(snapshot.entitlements.len(), 5);

        let grant_ids: Vec<String> = snapshot.grants.iter().map(Grant::id).collect();
        assert_eq!(
            grant_ids,
            vec![
                "team:T1:member:user:U1",
                "team:T1:admin:user:U2",
                "schedule:S1:owner:team:T1",
                "schedule:S1:member:user:U1",
                "schedule:S1:member:user:U2",
            ]
        );

        let stats = driver.stats();
        assert_eq!(stats.runs_completed, 1);
        assert_eq!(stats.grants, 5);
        assert!(stats.last_error.is_none());
    }

    #[test]
    fn users_are_listed_without_grants() {
        let connector = Connector::new(upstream());
        let snapshot = SyncDriver::new(connector.resource_syncers()).run().unwrap();

        let users: Vec<&Resource> = snapshot
            .resources
            .iter()
            .filter(|r| matches!(r.shape, ResourceTrait::User(_)))
            .collect();
        assert_eq!(users.len(), 2);
        assert_eq!(connector.client().call_count(Operation::ListUsers), 2);
    }

    #[test]
    fn upstream_error_aborts_run() {
        let mock = Arc::new(upstream());
        mock.fail_next(Operation::ListRotationMembers, ClientError::status(500));
        let connector = Connector::from_arc(Arc::clone(&mock));
        let driver = SyncDriver::new(connector.resource_syncers());

        let err = driver.run().unwrap_err();
        assert_eq!(err.operation(), Some(Operation::ListRotationMembers));
        assert!(driver.stats().last_error.is_some());
        assert_eq!(driver.stats().runs_completed, 0);
    }

    #[test]
    fn page_limit_stops_runaway_listing() {
        let driver = SyncDriver::new(vec![Box::new(EndlessSyncer)]).with_max_pages(3);
        assert!(matches!(
            driver.run(),
            Err(ConnectorError::PageLimitExceeded { limit: 3, .. })
        ));
        assert_eq!(driver.stats().calls, 3);
    }
}
