//! Full sync over the HTTP client and the in-process fixture server.

use rootly_connector::{Connector, ConnectorError, SyncDriver};
use rootly_model::{Grant, ResourceKind, TraversalStack};
use rootly_testkit::prelude::*;

fn server() -> FixtureServer {
    FixtureServer::new()
        .with_user(user("96913", "ada", "ada@example.com"))
        .with_user(user("97487", "grace", "grace@example.com"))
        .with_user(user("97488", "", "linus@example.com"))
        .with_team(team("sre", "SRE", &["96913", "97487"], &["96913"]))
        .with_secret(secret("sec-1", "PAGERDUTY_TOKEN"))
        .with_schedule(schedule("S1", "Primary", Some("96913"), &["sre"]))
        .with_on_call("S1", &["97487"])
        .with_rotations("S1", &["A", "B", "C"])
        .with_rotation_members("A", &["96913", "97487", "97488"])
        .with_rotation_members("B", &["97488"])
}

#[test]
fn syncs_everything_over_loopback() {
    let client = loopback_client_with(fixture_config().with_page_size(2), server());
    let connector = Connector::new(client);
    connector.validate().unwrap();

    let snapshot = SyncDriver::new(connector.resource_syncers()).run().unwrap();

    let count = |kind: ResourceKind| snapshot.resources.iter().filter(|r| r.kind() == kind).count();
    assert_eq!(count(ResourceKind::User), 3);
    assert_eq!(count(ResourceKind::Team), 1);
    assert_eq!(count(ResourceKind::Secret), 1);
    assert_eq!(count(ResourceKind::Schedule), 1);

    let linus = snapshot
        .resources
        .iter()
        .find(|r| r.id.id == "97488")
        .unwrap();
    assert_eq!(linus.display_name, "linus@example.com");

    let grant_ids: Vec<String> = snapshot.grants.iter().map(Grant::id).collect();
    assert_eq!(
        grant_ids,
        vec![
            "team:sre:member:user:96913",
            "team:sre:member:user:97487",
            "team:sre:admin:user:96913",
            "schedule:S1:owner:user:96913",
            "schedule:S1:owner:team:sre",
            "schedule:S1:on-call:user:97487",
            "schedule:S1:member:user:96913",
            "schedule:S1:member:user:97487",
            "schedule:S1:member:user:97488",
            "schedule:S1:member:user:97488",
        ]
    );
}

#[test]
fn schedule_tokens_carry_upstream_cursors() {
    let client = loopback_client_with(fixture_config().with_page_size(2), server());
    let connector = Connector::new(client);
    let syncers = connector.resource_syncers();
    let schedules = syncers
        .iter()
        .find(|s| s.resource_type().kind == ResourceKind::Schedule)
        .unwrap();

    let resource = schedules.list(None, "").unwrap().items.remove(0);
    let first = schedules.grants(&resource, "").unwrap();
    assert_eq!(first.items.len(), 3);

    let stack = TraversalStack::decode(&first.next_token).unwrap();
    assert_eq!(stack.len(), 3);
    let bottom = serde_json::to_value(&stack.frames()[0]).unwrap();
    assert!(bottom["rotation_cursor"]
        .as_str()
        .unwrap()
        .starts_with(FIXTURE_BASE_URL));
}

#[test]
fn failed_step_can_be_retried_with_same_token() {
    let fixture = server();
    let client = loopback_client_with(
        fixture_config().with_retry(rootly_client::RetryConfig::no_retry()),
        fixture,
    );
    let connector = Connector::new(client);
    let syncers = connector.resource_syncers();
    let schedules = &syncers[3];

    let resource = schedules.list(None, "").unwrap().items.remove(0);
    let first = schedules.grants(&resource, "").unwrap();

    connector
        .client()
        .http()
        .server()
        .fail_next("/v1/schedule_rotations/A", 503);
    let err = schedules.grants(&resource, &first.next_token).unwrap_err();
    assert!(matches!(err, ConnectorError::Upstream { .. }));

    let retry = schedules.grants(&resource, &first.next_token).unwrap();
    assert_eq!(retry.items.len(), 3);
}
