//! HTTP implementation of the upstream client.
//!
//! The actual HTTP library is abstracted via the `HttpClient` trait so the
//! JSON:API handling, pagination and retry logic can be exercised without a
//! network (see `LoopbackClient`).

use crate::config::ClientConfig;
use crate::error::{require, ClientError, ClientResult};
use crate::models::{
    Document, ErrorDocument, Identified, ResourceObject, RotationUserAttributes,
    ScheduleAttributes, SecretAttributes, TeamAttributes, UserAttributes,
};
use crate::upstream::{
    Operation, Page, Schedule, ScheduleOwners, Secret, ShiftWindow, Team, UpstreamClient, User,
};
use chrono::SecondsFormat;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Media type of JSON:API documents.
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// An outgoing GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute URL.
    pub url: String,
    /// Request headers.
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Returns the first header with the given (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, if present.
    pub content_type: Option<String>,
    /// `Retry-After` header in seconds, if present.
    pub retry_after: Option<Duration>,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a JSON:API response.
    pub fn json_api(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: Some(JSON_API_MEDIA_TYPE.to_string()),
            retry_after: None,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual HTTP transport. Errors are
/// reported as strings and treated as retryable transport failures.
pub trait HttpClient: Send + Sync {
    /// Sends a GET request and returns the response.
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, String>;
}

/// Trait for servers that can answer loopback requests.
pub trait LoopbackServer {
    /// Handles a GET for `path_and_query` (e.g. `/v1/users?page%5Bnumber%5D=1`).
    fn handle_get(&self, path_and_query: &str, request: &HttpRequest) -> HttpResponse;
}

/// A loopback HTTP client that routes requests directly to an in-process server.
///
/// Useful for testing without actual network overhead.
pub struct LoopbackClient<S: LoopbackServer> {
    server: S,
}

impl<S: LoopbackServer + Send + Sync> LoopbackClient<S> {
    /// Creates a new loopback client connected to the given server.
    pub fn new(server: S) -> Self {
        Self { server }
    }

    /// Returns the server.
    pub fn server(&self) -> &S {
        &self.server
    }
}

impl<S: LoopbackServer + Send + Sync> HttpClient for LoopbackClient<S> {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, String> {
        let url = Url::parse(&request.url).map_err(|e| e.to_string())?;
        let path_and_query = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        Ok(self.server.handle_get(&path_and_query, request))
    }
}

/// Rootly JSON:API client.
pub struct RootlyClient<C: HttpClient> {
    config: ClientConfig,
    base_url: String,
    client: C,
}

impl<C: HttpClient> RootlyClient<C> {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if the configured base URL is not
    /// an absolute URL.
    pub fn new(config: ClientConfig, client: C) -> ClientResult<Self> {
        let parsed = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.base_url.clone()));
        }
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// Returns the normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the underlying HTTP client.
    pub fn http(&self) -> &C {
        &self.client
    }

    /// Builds the URL for `path` with the given query parameters.
    fn url(&self, path: &str, query: &[(&str, String)]) -> ClientResult<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Resolves the URL of a collection page.
    ///
    /// An empty cursor yields the first page; otherwise the cursor is the
    /// `links.next` URL of the previous page and is used verbatim.
    fn page_url(&self, path: &str, cursor: &str) -> ClientResult<Url> {
        if cursor.is_empty() {
            return self.url(
                path,
                &[
                    ("page[number]", "1".to_string()),
                    ("page[size]", self.config.page_size.to_string()),
                ],
            );
        }

        let same_origin = cursor
            .strip_prefix(self.base_url.as_str())
            .is_some_and(|rest| rest.starts_with('/'));
        if !same_origin {
            return Err(ClientError::InvalidCursor {
                base_url: self.base_url.clone(),
            });
        }
        Url::parse(cursor).map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    /// Fetches and decodes a document, retrying transient failures.
    fn fetch<D: DeserializeOwned>(&self, operation: Operation, url: &Url) -> ClientResult<D> {
        let retry = &self.config.retry;
        let mut attempt = 0;

        loop {
            match self.send(operation, url) {
                Ok(document) => return Ok(document),
                Err(e) if e.is_retryable() && attempt + 1 < retry.max_attempts => {
                    attempt += 1;
                    let delay = e
                        .retry_after()
                        .unwrap_or_else(|| retry.delay_for_attempt(attempt))
                        .min(retry.max_delay);
                    warn!(
                        operation = operation.as_str(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying upstream request"
                    );
                    std::thread::sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn send<D: DeserializeOwned>(&self, operation: Operation, url: &Url) -> ClientResult<D> {
        let request = HttpRequest {
            url: url.to_string(),
            headers: vec![
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", self.config.api_key.expose_secret()),
                ),
                ("Accept".to_string(), JSON_API_MEDIA_TYPE.to_string()),
            ],
        };

        debug!(operation = operation.as_str(), method = "GET", url = %url, "sending request");
        let response = self
            .client
            .get(&request)
            .map_err(ClientError::transport)?;

        if !response.is_success() {
            let error = serde_json::from_slice::<ErrorDocument>(&response.body)
                .ok()
                .and_then(|doc| doc.errors.into_iter().next());
            return Err(ClientError::Status {
                status: response.status,
                error,
                retry_after: response.retry_after,
            });
        }

        let content_type = response.content_type.as_deref().unwrap_or_default();
        if !is_json_content_type(content_type) {
            return Err(ClientError::Decode(format!(
                "unexpected content type {:?}, status {}",
                content_type, response.status
            )));
        }

        serde_json::from_slice(&response.body).map_err(|e| {
            ClientError::Decode(format!("{} (status {})", e, response.status))
        })
    }

    fn list_page<A, T>(
        &self,
        operation: Operation,
        path: &str,
        cursor: &str,
    ) -> ClientResult<Page<T>>
    where
        A: DeserializeOwned,
        T: From<ResourceObject<A>>,
    {
        let url = self.page_url(path, cursor)?;
        let doc: Document<Vec<ResourceObject<A>>> = self.fetch(operation, &url)?;
        let next_cursor = doc.next_cursor();
        Ok(Page::new(
            doc.data.into_iter().map(T::from).collect(),
            next_cursor,
        ))
    }
}

/// Returns true for `application/vnd.api+json` and `application/json`.
fn is_json_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type == JSON_API_MEDIA_TYPE || media_type == "application/json"
}

impl<C: HttpClient> UpstreamClient for RootlyClient<C> {
    fn list_users(&self, cursor: &str) -> ClientResult<Page<User>> {
        self.list_page::<UserAttributes, User>(Operation::ListUsers, "/v1/users", cursor)
    }

    fn list_teams(&self, cursor: &str) -> ClientResult<Page<Team>> {
        self.list_page::<TeamAttributes, Team>(Operation::ListTeams, "/v1/teams", cursor)
    }

    fn get_team(&self, team_id: &str) -> ClientResult<Team> {
        require(team_id, "team_id")?;
        let url = self.url(&format!("/v1/teams/{}", team_id), &[])?;
        let doc: Document<ResourceObject<TeamAttributes>> = self.fetch(Operation::GetTeam, &url)?;
        Ok(doc.data.into())
    }

    fn list_secrets(&self, cursor: &str) -> ClientResult<Page<Secret>> {
        self.list_page::<SecretAttributes, Secret>(Operation::ListSecrets, "/v1/secrets", cursor)
    }

    fn list_schedules(&self, cursor: &str) -> ClientResult<Page<Schedule>> {
        self.list_page::<ScheduleAttributes, Schedule>(
            Operation::ListSchedules,
            "/v1/schedules",
            cursor,
        )
    }

    fn get_schedule_owners(&self, schedule_id: &str) -> ClientResult<ScheduleOwners> {
        require(schedule_id, "schedule_id")?;
        let url = self.url(&format!("/v1/schedules/{}", schedule_id), &[])?;
        let doc: Document<ResourceObject<ScheduleAttributes>> =
            self.fetch(Operation::GetSchedule, &url)?;
        Ok(Schedule::from(doc.data).owners())
    }

    fn list_schedule_rotations(
        &self,
        schedule_id: &str,
        cursor: &str,
    ) -> ClientResult<Page<String>> {
        require(schedule_id, "schedule_id")?;
        let path = format!("/v1/schedules/{}/schedule_rotations", schedule_id);
        let url = self.page_url(&path, cursor)?;
        let doc: Document<Vec<Identified>> = self.fetch(Operation::ListScheduleRotations, &url)?;
        let next_cursor = doc.next_cursor();
        Ok(Page::new(
            doc.data.into_iter().map(|rotation| rotation.id).collect(),
            next_cursor,
        ))
    }

    fn list_rotation_members(&self, rotation_id: &str, cursor: &str) -> ClientResult<Page<String>> {
        require(rotation_id, "rotation_id")?;
        let path = format!("/v1/schedule_rotations/{}/schedule_rotation_users", rotation_id);
        let url = self.page_url(&path, cursor)?;
        let doc: Document<Vec<ResourceObject<RotationUserAttributes>>> =
            self.fetch(Operation::ListRotationMembers, &url)?;
        let next_cursor = doc.next_cursor();
        Ok(Page::new(
            doc.data
                .into_iter()
                .map(|member| member.attributes.user_id.to_string())
                .collect(),
            next_cursor,
        ))
    }

    fn list_on_call_user_ids(
        &self,
        schedule_id: &str,
        window: &ShiftWindow,
    ) -> ClientResult<Vec<String>> {
        require(schedule_id, "schedule_id")?;
        let url = self.url(
            &format!("/v1/schedules/{}/shifts", schedule_id),
            &[
                ("from", window.from.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("to", window.to.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("include", "user".to_string()),
            ],
        )?;
        let doc: Document<Vec<Identified>> = self.fetch(Operation::ListCurrentShifts, &url)?;

        let mut user_ids: Vec<String> = Vec::new();
        for included in doc.included {
            if included.kind == "users" && !user_ids.contains(&included.id) {
                user_ids.push(included.id);
            }
        }
        Ok(user_ids)
    }
}
