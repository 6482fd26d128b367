//! In-process JSON:API server for loopback tests.
//!
//! `FixtureServer` answers the Rootly endpoints the sync consumes from an
//! in-memory dataset. It paginates with `page[number]`/`page[size]` and
//! links to the next page the same way the hosted API does, so the client's
//! cursor handling runs unmodified.

use parking_lot::Mutex;
use rootly_client::{HttpRequest, HttpResponse, LoopbackServer, Schedule, Secret, Team, User};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use url::Url;

/// Base URL the fixture server pretends to live at.
pub const FIXTURE_BASE_URL: &str = "https://rootly.test";

/// API key the fixture server accepts.
pub const FIXTURE_API_KEY: &str = "fixture-api-key";

const DEFAULT_SERVER_PAGE_SIZE: usize = 20;

/// A scripted failure for requests whose path starts with a prefix.
struct Failure {
    path_prefix: String,
    status: u16,
    retry_after: Option<Duration>,
}

/// In-memory Rootly API.
#[derive(Default)]
pub struct FixtureServer {
    users: Vec<User>,
    teams: Vec<Team>,
    secrets: Vec<Secret>,
    schedules: Vec<Schedule>,
    rotations: HashMap<String, Vec<String>>,
    rotation_members: HashMap<String, Vec<String>>,
    on_call: HashMap<String, Vec<String>>,
    failures: Mutex<VecDeque<Failure>>,
    requests: Mutex<Vec<String>>,
}

impl FixtureServer {
    /// Creates an empty server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user.
    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    /// Adds a team.
    pub fn with_team(mut self, team: Team) -> Self {
        self.teams.push(team);
        self
    }

    /// Adds a secret.
    pub fn with_secret(mut self, secret: Secret) -> Self {
        self.secrets.push(secret);
        self
    }

    /// Adds a schedule.
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedules.push(schedule);
        self
    }

    /// Sets a schedule's rotation ids.
    pub fn with_rotations(mut self, schedule_id: &str, rotation_ids: &[&str]) -> Self {
        self.rotations
            .insert(schedule_id.to_string(), to_strings(rotation_ids));
        self
    }

    /// Sets a rotation's member user ids.
    pub fn with_rotation_members(mut self, rotation_id: &str, user_ids: &[&str]) -> Self {
        self.rotation_members
            .insert(rotation_id.to_string(), to_strings(user_ids));
        self
    }

    /// Sets the users on call for a schedule.
    pub fn with_on_call(mut self, schedule_id: &str, user_ids: &[&str]) -> Self {
        self.on_call
            .insert(schedule_id.to_string(), to_strings(user_ids));
        self
    }

    /// Fails the next request whose path starts with `path_prefix`.
    pub fn fail_next(&self, path_prefix: &str, status: u16) {
        self.failures.lock().push_back(Failure {
            path_prefix: path_prefix.to_string(),
            status,
            retry_after: None,
        });
    }

    /// Fails the next matching request with a `Retry-After` delay.
    pub fn throttle_next(&self, path_prefix: &str, retry_after: Duration) {
        self.failures.lock().push_back(Failure {
            path_prefix: path_prefix.to_string(),
            status: 429,
            retry_after: Some(retry_after),
        });
    }

    /// Returns the path and query of every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Returns how many requests hit a path starting with `path_prefix`.
    pub fn request_count(&self, path_prefix: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.starts_with(path_prefix))
            .count()
    }

    fn scripted_failure(&self, path: &str) -> Option<HttpResponse> {
        let mut failures = self.failures.lock();
        let index = failures.iter().position(|f| path.starts_with(&f.path_prefix))?;
        let failure = failures.remove(index)?;
        let mut response = error_response(failure.status, "Scripted failure");
        response.retry_after = failure.retry_after;
        Some(response)
    }

    fn route(&self, path: &str, query: &HashMap<String, String>) -> HttpResponse {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match segments.as_slice() {
            ["v1", "users"] => {
                let items: Vec<Value> = self.users.iter().map(user_object).collect();
                collection(path, query, items)
            }
            ["v1", "teams"] => {
                let items: Vec<Value> = self.teams.iter().map(team_object).collect();
                collection(path, query, items)
            }
            ["v1", "teams", id] => match self.teams.iter().find(|t| t.id == *id) {
                Some(team) => single(team_object(team)),
                None => error_response(404, "Team not found"),
            },
            ["v1", "secrets"] => {
                let items: Vec<Value> = self.secrets.iter().map(secret_object).collect();
                collection(path, query, items)
            }
            ["v1", "schedules"] => {
                let items: Vec<Value> = self.schedules.iter().map(schedule_object).collect();
                collection(path, query, items)
            }
            ["v1", "schedules", id] => match self.schedules.iter().find(|s| s.id == *id) {
                Some(schedule) => single(schedule_object(schedule)),
                None => error_response(404, "Schedule not found"),
            },
            ["v1", "schedules", id, "schedule_rotations"] => {
                let items = self
                    .rotations
                    .get(*id)
                    .map(|ids| ids.iter().map(|r| rotation_object(r, id)).collect())
                    .unwrap_or_default();
                collection(path, query, items)
            }
            ["v1", "schedule_rotations", id, "schedule_rotation_users"] => {
                let items = self
                    .rotation_members
                    .get(*id)
                    .map(|ids| ids.iter().map(|u| rotation_user_object(id, u)).collect())
                    .unwrap_or_default();
                collection(path, query, items)
            }
            ["v1", "schedules", id, "shifts"] => self.shifts(id, query),
            _ => error_response(404, "Not found"),
        }
    }

    fn shifts(&self, schedule_id: &str, query: &HashMap<String, String>) -> HttpResponse {
        if !query.contains_key("from") || !query.contains_key("to") {
            return error_response(400, "from and to are required");
        }
        let on_call = self.on_call.get(schedule_id).cloned().unwrap_or_default();

        let shifts: Vec<Value> = on_call
            .iter()
            .enumerate()
            .map(|(i, user_id)| {
                json!({
                    "id": format!("{schedule_id}-shift-{i}"),
                    "type": "shifts",
                    "attributes": {
                        "schedule_id": schedule_id,
                        "starts_at": query["from"],
                        "ends_at": query["to"]
                    },
                    "relationships": {"user": {"data": {"id": user_id, "type": "users"}}}
                })
            })
            .collect();

        let included: Vec<Value> = on_call
            .iter()
            .map(|user_id| match self.users.iter().find(|u| &u.id == user_id) {
                Some(user) => user_object(user),
                None => json!({"id": user_id, "type": "users", "attributes": {}}),
            })
            .collect();

        ok(json!({"data": shifts, "included": included}))
    }
}

impl LoopbackServer for FixtureServer {
    fn handle_get(&self, path_and_query: &str, request: &HttpRequest) -> HttpResponse {
        self.requests.lock().push(path_and_query.to_string());

        let expected = format!("Bearer {FIXTURE_API_KEY}");
        if request.header("Authorization") != Some(expected.as_str()) {
            return error_response(401, "Unauthorized");
        }

        let Ok(url) = Url::parse(&format!("{FIXTURE_BASE_URL}{path_and_query}")) else {
            return error_response(400, "Bad request");
        };
        if let Some(failure) = self.scripted_failure(url.path()) {
            return failure;
        }

        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        self.route(url.path(), &query)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Rootly serializes user ids as numbers.
fn numeric(id: &str) -> Value {
    id.parse::<i64>().map(Value::from).unwrap_or_else(|_| Value::from(id))
}

fn non_empty(value: &str) -> Value {
    if value.is_empty() {
        Value::Null
    } else {
        Value::from(value)
    }
}

fn user_object(user: &User) -> Value {
    json!({
        "id": user.id,
        "type": "users",
        "attributes": {
            "name": non_empty(&user.name),
            "email": non_empty(&user.email),
            "full_name": non_empty(&user.full_name),
            "slack_id": non_empty(&user.slack_id),
            "phone": non_empty(&user.phone),
            "created_at": non_empty(&user.created_at),
            "updated_at": non_empty(&user.updated_at)
        }
    })
}

fn team_object(team: &Team) -> Value {
    json!({
        "id": team.id,
        "type": "groups",
        "attributes": {
            "name": team.name,
            "description": non_empty(&team.description),
            "user_ids": team.member_ids.iter().map(|id| numeric(id)).collect::<Vec<_>>(),
            "admin_ids": team.admin_ids.iter().map(|id| numeric(id)).collect::<Vec<_>>(),
            "created_at": non_empty(&team.created_at),
            "updated_at": non_empty(&team.updated_at)
        }
    })
}

fn secret_object(secret: &Secret) -> Value {
    json!({
        "id": secret.id,
        "type": "secrets",
        "attributes": {
            "name": secret.name,
            "kind": "built_in",
            "created_at": non_empty(&secret.created_at),
            "updated_at": non_empty(&secret.updated_at)
        }
    })
}

fn schedule_object(schedule: &Schedule) -> Value {
    json!({
        "id": schedule.id,
        "type": "schedules",
        "attributes": {
            "name": schedule.name,
            "description": non_empty(&schedule.description),
            "owner_user_id": schedule.owner_user_id.as_deref().map(numeric),
            "owner_group_ids": schedule.owner_team_ids,
            "created_at": non_empty(&schedule.created_at),
            "updated_at": non_empty(&schedule.updated_at)
        }
    })
}

fn rotation_object(rotation_id: &str, schedule_id: &str) -> Value {
    json!({
        "id": rotation_id,
        "type": "schedule_rotations",
        "attributes": {"schedule_id": schedule_id, "name": format!("Rotation {rotation_id}")}
    })
}

fn rotation_user_object(rotation_id: &str, user_id: &str) -> Value {
    json!({
        "id": format!("{rotation_id}-{user_id}"),
        "type": "schedule_rotation_users",
        "attributes": {"schedule_rotation_id": rotation_id, "user_id": numeric(user_id)}
    })
}

fn page_param(query: &HashMap<String, String>, key: &str, default: usize) -> usize {
    query
        .get(key)
        .and_then(|v| v.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn collection(
    path: &str,
    query: &HashMap<String, String>,
    items: Vec<Value>,
) -> HttpResponse {
    let number = page_param(query, "page[number]", 1);
    let size = page_param(query, "page[size]", DEFAULT_SERVER_PAGE_SIZE);

    let start = (number - 1).saturating_mul(size).min(items.len());
    let end = start.saturating_add(size).min(items.len());
    let next = if end < items.len() {
        Value::from(format!(
            "{FIXTURE_BASE_URL}{path}?page%5Bnumber%5D={}&page%5Bsize%5D={size}",
            number + 1
        ))
    } else {
        Value::Null
    };

    ok(json!({
        "data": items[start..end].to_vec(),
        "links": {"self": format!("{FIXTURE_BASE_URL}{path}"), "next": next},
        "meta": {"current_page": number, "total_count": items.len()}
    }))
}

fn single(object: Value) -> HttpResponse {
    ok(json!({"data": object}))
}

fn ok(document: Value) -> HttpResponse {
    HttpResponse::json_api(200, document.to_string())
}

fn error_response(status: u16, title: &str) -> HttpResponse {
    let body = json!({"errors": [{"title": title, "status": status.to_string()}]});
    HttpResponse::json_api(status, body.to_string())
}
