//! Team syncer.

use crate::error::{require, ConnectorError, ConnectorResult};
use crate::profile::{insert_non_empty, insert_timestamp};
use crate::syncer::{Listing, ResourceSyncer};
use rootly_client::{Operation, Team, UpstreamClient};
use rootly_model::catalog::{self, TEAM_ADMIN, TEAM_MEMBER};
use rootly_model::{
    Entitlement, Grant, Profile, Resource, ResourceId, ResourceKind, ResourceTrait, ResourceType,
};
use std::sync::Arc;
use tracing::debug;

/// Lists Rootly teams with their `admin` and `member` entitlements.
pub struct TeamSyncer<U: UpstreamClient> {
    client: Arc<U>,
}

impl<U: UpstreamClient> TeamSyncer<U> {
    /// Creates a team syncer.
    pub fn new(client: Arc<U>) -> Self {
        Self { client }
    }
}

fn team_resource(team: &Team, parent: Option<&ResourceId>) -> Resource {
    let mut profile = Profile::new();
    insert_non_empty(&mut profile, "team_id", &team.id);
    insert_non_empty(&mut profile, "name", &team.name);
    insert_non_empty(&mut profile, "description", &team.description);
    insert_timestamp(&mut profile, "created_at", &team.created_at);
    insert_timestamp(&mut profile, "updated_at", &team.updated_at);

    Resource::new(ResourceId::team(&team.id), &team.name, ResourceTrait::Group)
        .with_parent(parent.cloned())
        .with_profile(profile)
}

impl<U: UpstreamClient> ResourceSyncer for TeamSyncer<U> {
    fn resource_type(&self) -> &'static ResourceType {
        &catalog::TEAM
    }

    fn list(&self, parent: Option<&ResourceId>, token: &str) -> ConnectorResult<Listing<Resource>> {
        debug!(resource_type = "team", token, "listing resources");
        let page = self
            .client
            .list_teams(token)
            .map_err(ConnectorError::upstream(Operation::ListTeams))?;
        let resources = page.items.iter().map(|t| team_resource(t, parent)).collect();
        Ok(Listing::new(resources, page.next_cursor))
    }

    fn entitlements(
        &self,
        resource: &Resource,
        _token: &str,
    ) -> ConnectorResult<Listing<Entitlement>> {
        let name = &resource.display_name;
        Ok(Listing::done(vec![
            Entitlement::assignment(resource, TEAM_ADMIN)
                .with_display_name(format!("{name} Team Admin"))
                .with_description(format!("Admin of the {name} team in Rootly"))
                .with_grantable_to(&[ResourceKind::User]),
            Entitlement::assignment(resource, TEAM_MEMBER)
                .with_display_name(format!("{name} Team Member"))
                .with_description(format!("Member of the {name} team in Rootly"))
                .with_grantable_to(&[ResourceKind::User]),
        ]))
    }

    fn grants(&self, resource: &Resource, token: &str) -> ConnectorResult<Listing<Grant>> {
        debug!(resource = %resource.id, token, "listing team grants");
        require(&resource.id.id, "team_id")?;

        let team = self
            .client
            .get_team(&resource.id.id)
            .map_err(ConnectorError::upstream(Operation::GetTeam))?;

        let members = team
            .member_ids
            .iter()
            .map(|id| Grant::new(&resource.id, TEAM_MEMBER, ResourceId::user(id)));
        let admins = team
            .admin_ids
            .iter()
            .map(|id| Grant::new(&resource.id, TEAM_ADMIN, ResourceId::user(id)));

        Ok(Listing::done(members.chain(admins).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootly_client::{ClientError, MockUpstream};

    fn sre() -> Team {
        Team {
            id: "sre".into(),
            name: "SRE".into(),
            member_ids: vec!["1".into(), "2".into()],
            admin_ids: vec!["1".into()],
            ..Team::default()
        }
    }

    #[test]
    fn team_entitlements() {
        let syncer = TeamSyncer::new(Arc::new(MockUpstream::new()));
        let resource = team_resource(&sre(), None);
        let listing = syncer.entitlements(&resource, "ignored").unwrap();

        assert!(!listing.has_more());
        let names: Vec<&str> = listing.items.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["SRE Team Admin", "SRE Team Member"]);
        assert_eq!(listing.items[0].id(), "team:sre:admin");
        assert_eq!(listing.items[1].grantable_to, vec![ResourceKind::User]);
    }

    #[test]
    fn member_and_admin_grants_in_one_call() {
        let mock = Arc::new(MockUpstream::new().with_team(sre()));
        let syncer = TeamSyncer::new(Arc::clone(&mock));
        let resource = team_resource(&sre(), None);

        let listing = syncer.grants(&resource, "").unwrap();
        assert_eq!(listing.next_token, "");

        let ids: Vec<String> = listing.items.iter().map(Grant::id).collect();
        assert_eq!(
            ids,
            vec![
                "team:sre:member:user:1",
                "team:sre:member:user:2",
                "team:sre:admin:user:1",
            ]
        );
        assert_eq!(mock.call_count(Operation::GetTeam), 1);
    }

    #[test]
    fn token_is_ignored() {
        let mock = Arc::new(MockUpstream::new().with_team(sre()));
        let syncer = TeamSyncer::new(mock);
        let resource = team_resource(&sre(), None);

        let listing = syncer.grants(&resource, "not-a-token").unwrap();
        assert_eq!(listing.items.len(), 3);
        assert!(!listing.has_more());
    }

    #[test]
    fn upstream_failure_is_wrapped() {
        let mock = Arc::new(MockUpstream::new().with_team(sre()));
        mock.fail_next(Operation::GetTeam, ClientError::status(500));
        let syncer = TeamSyncer::new(mock);

        let err = syncer.grants(&team_resource(&sre(), None), "").unwrap_err();
        assert_eq!(err.operation(), Some(Operation::GetTeam));
    }

    #[test]
    fn empty_team_id_is_rejected() {
        let syncer = TeamSyncer::new(Arc::new(MockUpstream::new()));
        let resource = team_resource(&Team::default(), None);
        assert!(matches!(
            syncer.grants(&resource, ""),
            Err(ConnectorError::RequiredFieldMissing("team_id"))
        ));
    }
}
