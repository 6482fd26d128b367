//! Upstream entity builders and client helpers.

use crate::server::{FixtureServer, FIXTURE_API_KEY, FIXTURE_BASE_URL};
use rootly_client::{
    ClientConfig, LoopbackClient, RetryConfig, RootlyClient, Schedule, Secret, Team, User,
};
use std::time::Duration;

/// Builds a user.
pub fn user(id: &str, name: &str, email: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        created_at: "2025-04-07T08:00:54.675-07:00".to_string(),
        updated_at: "2025-04-10T16:25:18.032-07:00".to_string(),
        ..User::default()
    }
}

/// Builds a team with the given member and admin user ids.
pub fn team(id: &str, name: &str, member_ids: &[&str], admin_ids: &[&str]) -> Team {
    Team {
        id: id.to_string(),
        name: name.to_string(),
        member_ids: to_strings(member_ids),
        admin_ids: to_strings(admin_ids),
        ..Team::default()
    }
}

/// Builds a secret.
pub fn secret(id: &str, name: &str) -> Secret {
    Secret {
        id: id.to_string(),
        name: name.to_string(),
        created_at: "2025-04-07T08:00:54.675-07:00".to_string(),
        ..Secret::default()
    }
}

/// Builds a schedule with an optional owning user and owning teams.
pub fn schedule(
    id: &str,
    name: &str,
    owner_user_id: Option<&str>,
    owner_team_ids: &[&str],
) -> Schedule {
    Schedule {
        id: id.to_string(),
        name: name.to_string(),
        owner_user_id: owner_user_id.map(str::to_string),
        owner_team_ids: to_strings(owner_team_ids),
        ..Schedule::default()
    }
}

/// Returns a client configuration pointing at the fixture server.
///
/// Retries are fast and jitter-free so retry tests stay deterministic.
pub fn fixture_config() -> ClientConfig {
    ClientConfig::new(FIXTURE_API_KEY)
        .with_base_url(FIXTURE_BASE_URL)
        .with_retry(
            RetryConfig::new(3)
                .with_initial_delay(Duration::from_millis(1))
                .with_max_delay(Duration::from_millis(5))
                .without_jitter(),
        )
}

/// Creates a `RootlyClient` that talks to `server` in-process.
pub fn loopback_client(server: FixtureServer) -> RootlyClient<LoopbackClient<FixtureServer>> {
    loopback_client_with(fixture_config(), server)
}

/// Creates a loopback `RootlyClient` with a custom configuration.
pub fn loopback_client_with(
    config: ClientConfig,
    server: FixtureServer,
) -> RootlyClient<LoopbackClient<FixtureServer>> {
    RootlyClient::new(config, LoopbackClient::new(server)).expect("fixture base url is valid")
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
