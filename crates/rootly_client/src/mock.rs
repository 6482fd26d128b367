//! In-memory upstream for tests.

use crate::error::{require, ClientError, ClientResult};
use crate::upstream::{
    Operation, Page, Schedule, ScheduleOwners, Secret, ShiftWindow, Team, UpstreamClient, User,
};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Mock upstream for testing.
///
/// Collections are paginated by `page_size`; rotation and member lists are
/// served in the explicit pages they were configured with. Cursors are the
/// decimal index of the next page. Every call is recorded, and failures can
/// be scripted per operation with `fail_next`.
#[derive(Default)]
pub struct MockUpstream {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    page_size: Option<usize>,
    users: Vec<User>,
    teams: Vec<Team>,
    secrets: Vec<Secret>,
    schedules: Vec<Schedule>,
    rotation_pages: HashMap<String, Vec<Vec<String>>>,
    member_pages: HashMap<String, Vec<Vec<String>>>,
    on_call: HashMap<String, Vec<String>>,
    failures: Vec<(Operation, ClientError)>,
    calls: Vec<(Operation, String)>,
    shift_windows: Vec<ShiftWindow>,
}

impl MockUpstream {
    /// Creates an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size used for users, teams, secrets and schedules.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.state.get_mut().page_size = Some(size.max(1));
        self
    }

    /// Adds a user.
    pub fn with_user(mut self, user: User) -> Self {
        self.state.get_mut().users.push(user);
        self
    }

    /// Adds a team.
    pub fn with_team(mut self, team: Team) -> Self {
        self.state.get_mut().teams.push(team);
        self
    }

    /// Adds a secret.
    pub fn with_secret(mut self, secret: Secret) -> Self {
        self.state.get_mut().secrets.push(secret);
        self
    }

    /// Adds a schedule.
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.state.get_mut().schedules.push(schedule);
        self
    }

    /// Sets a schedule's rotation ids, one inner vector per page.
    pub fn with_rotation_pages(mut self, schedule_id: &str, pages: Vec<Vec<&str>>) -> Self {
        self.state
            .get_mut()
            .rotation_pages
            .insert(schedule_id.to_string(), owned_pages(pages));
        self
    }

    /// Sets a rotation's member user ids, one inner vector per page.
    pub fn with_member_pages(mut self, rotation_id: &str, pages: Vec<Vec<&str>>) -> Self {
        self.state
            .get_mut()
            .member_pages
            .insert(rotation_id.to_string(), owned_pages(pages));
        self
    }

    /// Sets the users currently on call for a schedule.
    pub fn with_on_call(mut self, schedule_id: &str, user_ids: &[&str]) -> Self {
        self.state.get_mut().on_call.insert(
            schedule_id.to_string(),
            user_ids.iter().map(|id| id.to_string()).collect(),
        );
        self
    }

    /// Makes the next call of `operation` fail with `error`.
    ///
    /// Failures queue up: scripting two failures fails the next two calls.
    pub fn fail_next(&self, operation: Operation, error: ClientError) {
        self.state.lock().failures.push((operation, error));
    }

    /// Returns every call made so far, with its primary argument.
    pub fn calls(&self) -> Vec<(Operation, String)> {
        self.state.lock().calls.clone()
    }

    /// Returns how often `operation` was called.
    pub fn call_count(&self, operation: Operation) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|(op, _)| *op == operation)
            .count()
    }

    /// Returns the shift windows passed to `list_on_call_user_ids`.
    pub fn shift_windows(&self) -> Vec<ShiftWindow> {
        self.state.lock().shift_windows.clone()
    }

    /// Records a call and returns a scripted failure, if one is queued.
    fn enter(&self, operation: Operation, argument: &str) -> ClientResult<()> {
        let mut state = self.state.lock();
        state.calls.push((operation, argument.to_string()));
        match state.failures.iter().position(|(op, _)| *op == operation) {
            Some(index) => Err(state.failures.remove(index).1),
            None => Ok(()),
        }
    }
}

fn owned_pages(pages: Vec<Vec<&str>>) -> Vec<Vec<String>> {
    pages
        .into_iter()
        .map(|page| page.into_iter().map(str::to_string).collect())
        .collect()
}

fn page_index(cursor: &str) -> ClientResult<usize> {
    if cursor.is_empty() {
        return Ok(0);
    }
    cursor.parse().map_err(|_| ClientError::InvalidCursor {
        base_url: "mock".to_string(),
    })
}

fn next_cursor(index: usize, total: usize) -> String {
    if index + 1 < total {
        (index + 1).to_string()
    } else {
        String::new()
    }
}

/// Slices `items` into pages of `size`.
fn paginate<T: Clone>(items: &[T], size: Option<usize>, cursor: &str) -> ClientResult<Page<T>> {
    let size = size.unwrap_or(usize::MAX);
    let index = page_index(cursor)?;
    let total = items.len().div_ceil(size).max(1);
    let start = index.saturating_mul(size).min(items.len());
    let end = start.saturating_add(size).min(items.len());
    Ok(Page::new(items[start..end].to_vec(), next_cursor(index, total)))
}

/// Serves one of the explicitly configured pages.
fn explicit_page(pages: Option<&Vec<Vec<String>>>, cursor: &str) -> ClientResult<Page<String>> {
    let index = page_index(cursor)?;
    let Some(pages) = pages else {
        return Ok(Page::last(Vec::new()));
    };
    let items = pages.get(index).cloned().unwrap_or_default();
    Ok(Page::new(items, next_cursor(index, pages.len())))
}

impl UpstreamClient for MockUpstream {
    fn list_users(&self, cursor: &str) -> ClientResult<Page<User>> {
        self.enter(Operation::ListUsers, cursor)?;
        let state = self.state.lock();
        paginate(&state.users, state.page_size, cursor)
    }

    fn list_teams(&self, cursor: &str) -> ClientResult<Page<Team>> {
        self.enter(Operation::ListTeams, cursor)?;
        let state = self.state.lock();
        paginate(&state.teams, state.page_size, cursor)
    }

    fn get_team(&self, team_id: &str) -> ClientResult<Team> {
        require(team_id, "team_id")?;
        self.enter(Operation::GetTeam, team_id)?;
        self.state
            .lock()
            .teams
            .iter()
            .find(|team| team.id == team_id)
            .cloned()
            .ok_or_else(|| ClientError::status(404))
    }

    fn list_secrets(&self, cursor: &str) -> ClientResult<Page<Secret>> {
        self.enter(Operation::ListSecrets, cursor)?;
        let state = self.state.lock();
        paginate(&state.secrets, state.page_size, cursor)
    }

    fn list_schedules(&self, cursor: &str) -> ClientResult<Page<Schedule>> {
        self.enter(Operation::ListSchedules, cursor)?;
        let state = self.state.lock();
        paginate(&state.schedules, state.page_size, cursor)
    }

    fn get_schedule_owners(&self, schedule_id: &str) -> ClientResult<ScheduleOwners> {
        require(schedule_id, "schedule_id")?;
        self.enter(Operation::GetSchedule, schedule_id)?;
        self.state
            .lock()
            .schedules
            .iter()
            .find(|schedule| schedule.id == schedule_id)
            .map(Schedule::owners)
            .ok_or_else(|| ClientError::status(404))
    }

    fn list_schedule_rotations(
        &self,
        schedule_id: &str,
        cursor: &str,
    ) -> ClientResult<Page<String>> {
        require(schedule_id, "schedule_id")?;
        self.enter(Operation::ListScheduleRotations, schedule_id)?;
        explicit_page(self.state.lock().rotation_pages.get(schedule_id), cursor)
    }

    fn list_rotation_members(&self, rotation_id: &str, cursor: &str) -> ClientResult<Page<String>> {
        require(rotation_id, "rotation_id")?;
        self.enter(Operation::ListRotationMembers, rotation_id)?;
        explicit_page(self.state.lock().member_pages.get(rotation_id), cursor)
    }

    fn list_on_call_user_ids(
        &self,
        schedule_id: &str,
        window: &ShiftWindow,
    ) -> ClientResult<Vec<String>> {
        require(schedule_id, "schedule_id")?;
        self.enter(Operation::ListCurrentShifts, schedule_id)?;
        let mut state = self.state.lock();
        state.shift_windows.push(*window);
        Ok(state.on_call.get(schedule_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.into(),
            ..User::default()
        }
    }

    #[test]
    fn paginates_collections() {
        let mock = MockUpstream::new()
            .with_page_size(2)
            .with_user(user("1"))
            .with_user(user("2"))
            .with_user(user("3"));

        let first = mock.list_users("").unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.next_cursor, "1");

        let second = mock.list_users(&first.next_cursor).unwrap();
        assert_eq!(second.items, vec![user("3")]);
        assert!(!second.has_more());
    }

    #[test]
    fn empty_collection_is_single_last_page() {
        let mock = MockUpstream::new().with_page_size(2);
        let page = mock.list_secrets("").unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_more());
    }

    #[test]
    fn serves_explicit_pages() {
        let mock = MockUpstream::new().with_rotation_pages("S1", vec![vec!["A", "B"], vec!["C"]]);

        let first = mock.list_schedule_rotations("S1", "").unwrap();
        assert_eq!(first.items, vec!["A".to_string(), "B".to_string()]);
        let second = mock.list_schedule_rotations("S1", &first.next_cursor).unwrap();
        assert_eq!(second.items, vec!["C".to_string()]);
        assert!(!second.has_more());

        assert!(mock.list_schedule_rotations("S2", "").unwrap().items.is_empty());
    }

    #[test]
    fn scripted_failures_are_consumed_once() {
        let mock = MockUpstream::new();
        mock.fail_next(Operation::ListTeams, ClientError::status(503));

        assert!(mock.list_users("").is_ok());
        assert!(mock.list_teams("").is_err());
        assert!(mock.list_teams("").is_ok());
        assert_eq!(mock.call_count(Operation::ListTeams), 2);
    }

    #[test]
    fn unknown_entities_are_not_found() {
        let mock = MockUpstream::new();
        assert!(matches!(
            mock.get_team("T404"),
            Err(ClientError::Status { status: 404, .. })
        ));
        assert!(matches!(
            mock.get_schedule_owners("S404"),
            Err(ClientError::Status { status: 404, .. })
        ));
    }

    #[test]
    fn rejects_foreign_cursor() {
        let mock = MockUpstream::new();
        assert!(matches!(
            mock.list_users("https://api.rootly.com/v1/users"),
            Err(ClientError::InvalidCursor { .. })
        ));
    }
}
