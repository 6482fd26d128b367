//! Upstream client abstraction.

use crate::error::ClientResult;
use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// A page of items plus the cursor of the next page.
///
/// An empty `next_cursor` means the collection is exhausted. A non-empty
/// cursor is passed back verbatim to fetch the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Cursor of the next page, empty on the last page.
    pub next_cursor: String,
}

impl<T> Page<T> {
    /// Creates a page.
    pub fn new(items: Vec<T>, next_cursor: impl Into<String>) -> Self {
        Self {
            items,
            next_cursor: next_cursor.into(),
        }
    }

    /// Creates the last page of a collection.
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, String::new())
    }

    /// Returns true if more pages follow.
    pub fn has_more(&self) -> bool {
        !self.next_cursor.is_empty()
    }
}

/// A Rootly user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    /// User id.
    pub id: String,
    /// Short name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Full name.
    pub full_name: String,
    /// Slack handle.
    pub slack_id: String,
    /// Phone number.
    pub phone: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// A Rootly team.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Team {
    /// Team id.
    pub id: String,
    /// Team name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Member user ids.
    pub member_ids: Vec<String>,
    /// Admin user ids.
    pub admin_ids: Vec<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// A Rootly secret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Secret {
    /// Secret id.
    pub id: String,
    /// Secret name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// A Rootly on-call schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    /// Schedule id.
    pub id: String,
    /// Schedule name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Owning user id.
    pub owner_user_id: Option<String>,
    /// Owning team ids.
    pub owner_team_ids: Vec<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

impl Schedule {
    /// Returns the schedule's owners.
    pub fn owners(&self) -> ScheduleOwners {
        ScheduleOwners {
            user_id: self.owner_user_id.clone(),
            team_ids: self.owner_team_ids.clone(),
        }
    }
}

/// The owners of a schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleOwners {
    /// Owning user id.
    pub user_id: Option<String>,
    /// Owning team ids.
    pub team_ids: Vec<String>,
}

/// The time window used to look up current shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    /// Window start.
    pub from: DateTime<Utc>,
    /// Window end.
    pub to: DateTime<Utc>,
}

impl ShiftWindow {
    /// The one-hour window starting at `now`.
    pub fn current(now: DateTime<Utc>) -> Self {
        Self {
            from: now,
            to: now + Duration::hours(1),
        }
    }
}

/// Logical upstream operations, named for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// List users.
    ListUsers,
    /// List teams.
    ListTeams,
    /// Get a single team.
    GetTeam,
    /// List secrets.
    ListSecrets,
    /// List schedules.
    ListSchedules,
    /// Get a single schedule.
    GetSchedule,
    /// List a schedule's rotations.
    ListScheduleRotations,
    /// List a rotation's members.
    ListRotationMembers,
    /// List a schedule's current shifts.
    ListCurrentShifts,
}

impl Operation {
    /// Returns the operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListUsers => "list-users",
            Operation::ListTeams => "list-teams",
            Operation::GetTeam => "get-team",
            Operation::ListSecrets => "list-secrets",
            Operation::ListSchedules => "list-schedules",
            Operation::GetSchedule => "get-schedule",
            Operation::ListScheduleRotations => "list-schedule-rotations",
            Operation::ListRotationMembers => "list-rotation-members",
            Operation::ListCurrentShifts => "list-current-shifts",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read access to the Rootly collections the sync consumes.
///
/// Implementations own authentication, retries and wire decoding. Cursors
/// are opaque: an empty cursor requests the first page.
pub trait UpstreamClient: Send + Sync {
    /// Lists one page of users.
    fn list_users(&self, cursor: &str) -> ClientResult<Page<User>>;

    /// Lists one page of teams.
    fn list_teams(&self, cursor: &str) -> ClientResult<Page<Team>>;

    /// Gets a team with its member and admin ids.
    fn get_team(&self, team_id: &str) -> ClientResult<Team>;

    /// Lists one page of secrets.
    fn list_secrets(&self, cursor: &str) -> ClientResult<Page<Secret>>;

    /// Lists one page of schedules.
    fn list_schedules(&self, cursor: &str) -> ClientResult<Page<Schedule>>;

    /// Gets a schedule's owning user and teams.
    fn get_schedule_owners(&self, schedule_id: &str) -> ClientResult<ScheduleOwners>;

    /// Lists one page of a schedule's rotation ids.
    fn list_schedule_rotations(&self, schedule_id: &str, cursor: &str)
        -> ClientResult<Page<String>>;

    /// Lists one page of a rotation's member user ids.
    fn list_rotation_members(&self, rotation_id: &str, cursor: &str) -> ClientResult<Page<String>>;

    /// Lists the ids of users on call for a schedule within `window`.
    fn list_on_call_user_ids(
        &self,
        schedule_id: &str,
        window: &ShiftWindow,
    ) -> ClientResult<Vec<String>>;
}

impl<U: UpstreamClient + ?Sized> UpstreamClient for std::sync::Arc<U> {
    fn list_users(&self, cursor: &str) -> ClientResult<Page<User>> {
        (**self).list_users(cursor)
    }

    fn list_teams(&self, cursor: &str) -> ClientResult<Page<Team>> {
        (**self).list_teams(cursor)
    }

    fn get_team(&self, team_id: &str) -> ClientResult<Team> {
        (**self).get_team(team_id)
    }

    fn list_secrets(&self, cursor: &str) -> ClientResult<Page<Secret>> {
        (**self).list_secrets(cursor)
    }

    fn list_schedules(&self, cursor: &str) -> ClientResult<Page<Schedule>> {
        (**self).list_schedules(cursor)
    }

    fn get_schedule_owners(&self, schedule_id: &str) -> ClientResult<ScheduleOwners> {
        (**self).get_schedule_owners(schedule_id)
    }

    fn list_schedule_rotations(
        &self,
        schedule_id: &str,
        cursor: &str,
    ) -> ClientResult<Page<String>> {
        (**self).list_schedule_rotations(schedule_id, cursor)
    }

    fn list_rotation_members(&self, rotation_id: &str, cursor: &str) -> ClientResult<Page<String>> {
        (**self).list_rotation_members(rotation_id, cursor)
    }

    fn list_on_call_user_ids(
        &self,
        schedule_id: &str,
        window: &ShiftWindow,
    ) -> ClientResult<Vec<String>> {
        (**self).list_on_call_user_ids(schedule_id, window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn page_helpers() {
        let page = Page::new(vec![1, 2], "next");
        assert!(page.has_more());
        assert!(!Page::last(vec![3]).has_more());
    }

    #[test]
    fn shift_window_is_one_hour() {
        let now = Utc.with_ymd_and_hms(2025, 4, 10, 12, 0, 0).unwrap();
        let window = ShiftWindow::current(now);
        assert_eq!(window.from, now);
        assert_eq!(window.to - window.from, Duration::hours(1));
    }

    #[test]
    fn operation_names() {
        assert_eq!(Operation::ListScheduleRotations.as_str(), "list-schedule-rotations");
        assert_eq!(Operation::ListCurrentShifts.to_string(), "list-current-shifts");
    }

    #[test]
    fn schedule_owners() {
        let schedule = Schedule {
            id: "S1".into(),
            owner_user_id: Some("96913".into()),
            owner_team_ids: vec!["sre".into()],
            ..Schedule::default()
        };
        let owners = schedule.owners();
        assert_eq!(owners.user_id.as_deref(), Some("96913"));
        assert_eq!(owners.team_ids, vec!["sre".to_string()]);
    }
}
