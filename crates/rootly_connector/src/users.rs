//! User syncer.

use crate::error::{ConnectorError, ConnectorResult};
use crate::profile::{insert_non_empty, insert_timestamp, split_full_name, timestamp};
use crate::syncer::{Listing, ResourceSyncer};
use rootly_client::{Operation, UpstreamClient, User};
use rootly_model::{
    catalog, Entitlement, Grant, Profile, Resource, ResourceId, ResourceTrait, ResourceType,
    UserStatus, UserTrait,
};
use std::sync::Arc;
use tracing::debug;

/// Lists Rootly users. Users carry no entitlements or grants.
pub struct UserSyncer<U: UpstreamClient> {
    client: Arc<U>,
}

impl<U: UpstreamClient> UserSyncer<U> {
    /// Creates a user syncer.
    pub fn new(client: Arc<U>) -> Self {
        Self { client }
    }
}

/// Picks the first non-empty of name, full name and email.
fn display_name(user: &User) -> &str {
    [&user.name, &user.full_name, &user.email]
        .into_iter()
        .find(|value| !value.is_empty())
        .map(String::as_str)
        .unwrap_or(user.id.as_str())
}

/// Converts an upstream user into a resource.
fn user_resource(user: &User, parent: Option<&ResourceId>) -> Resource {
    let mut profile = Profile::new();
    insert_non_empty(&mut profile, "user_id", &user.id);
    insert_non_empty(&mut profile, "name", &user.name);
    insert_non_empty(&mut profile, "full_name", &user.full_name);
    let (first_name, last_name) = split_full_name(&user.full_name);
    insert_non_empty(&mut profile, "first_name", &first_name);
    insert_non_empty(&mut profile, "last_name", &last_name);
    insert_non_empty(&mut profile, "slack_id", &user.slack_id);
    insert_non_empty(&mut profile, "phone", &user.phone);
    insert_timestamp(&mut profile, "updated_at", &user.updated_at);

    let shape = ResourceTrait::User(UserTrait {
        email: user.email.clone(),
        status: UserStatus::Enabled,
        created_at: timestamp(&user.created_at),
    });

    Resource::new(ResourceId::user(&user.id), display_name(user), shape)
        .with_parent(parent.cloned())
        .with_profile(profile)
}

impl<U: UpstreamClient> ResourceSyncer for UserSyncer<U> {
    fn resource_type(&self) -> &'static ResourceType {
        &catalog::USER
    }

    fn list(&self, parent: Option<&ResourceId>, token: &str) -> ConnectorResult<Listing<Resource>> {
        debug!(resource_type = "user", token, "listing resources");
        let page = self
            .client
            .list_users(token)
            .map_err(ConnectorError::upstream(Operation::ListUsers))?;
        let resources = page.items.iter().map(|u| user_resource(u, parent)).collect();
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

#[cfg(test)]
mod tests {
    use super::*;
    use rootly_client::MockUpstream;

    fn sample() -> User {
        User {
            id: "96913".into(),
            name: String::new(),
            email: "ada@example.com".into(),
            full_name: "Ada Lovelace".into(),
            slack_id: "U024BE7LH".into(),
            created_at: "2025-04-07T08:00:54.675-07:00".into(),
            ..User::default()
        }
    }

    #[test]
    fn display_name_fallbacks() {
        let mut user = sample();
        assert_eq!(display_name(&user), "Ada Lovelace");
        user.name = "ada".into();
        assert_eq!(display_name(&user), "ada");
        user.name.clear();
        user.full_name.clear();
        assert_eq!(display_name(&user), "ada@example.com");
        user.email.clear();
        assert_eq!(display_name(&user), "96913");
    }

    #[test]
    fn builds_user_resource() {
        let resource = user_resource(&sample(), Some(&ResourceId::team("sre")));
        assert_eq!(resource.id, ResourceId::user("96913"));
        assert_eq!(resource.parent_id, Some(ResourceId::team("sre")));
        assert_eq!(resource.profile["first_name"], "Ada");
        assert_eq!(resource.profile["last_name"], "Lovelace");
        assert!(!resource.profile.contains_key("phone"));

        match resource.shape {
            ResourceTrait::User(shape) => {
                assert_eq!(shape.email, "ada@example.com");
                assert_eq!(shape.status, UserStatus::Enabled);
                assert_eq!(shape.created_at.as_deref(), Some("2025-04-07T15:00:54.675Z"));
            }
            other => panic!("expected user trait, got {:?}", other),
        }
    }

    #[test]
    fn lists_pages_with_upstream_cursor() {
        let mock = MockUpstream::new()
            .with_page_size(1)
            .with_user(sample())
            .with_user(User {
                id: "97487".into(),
                name: "grace".into(),
                ..User::default()
            });
        let syncer = UserSyncer::new(Arc::new(mock));

        let first = syncer.list(None, "").unwrap();
        assert_eq!(first.items.len(), 1);
        assert!(first.has_more());

        let second = syncer.list(None, &first.next_token).unwrap();
        assert_eq!(second.items[0].display_name, "grace");
        assert!(!second.has_more());
    }

    #[test]
    fn users_have_no_grants() {
        let syncer = UserSyncer::new(Arc::new(MockUpstream::new()));
        let resource = user_resource(&sample(), None);
        assert!(syncer.entitlements(&resource, "").unwrap().items.is_empty());
        let grants = syncer.grants(&resource, "").unwrap();
        assert!(grants.items.is_empty());
        assert!(!grants.has_more());
    }
}
