//! Schedule syncer and resumable grant traversal.
//!
//! Schedule grants span several upstream collections: the schedule's owners,
//! the users currently on call, and the members of every rotation. Rotations
//! and their members are paginated independently, so grant resolution is a
//! depth-first walk whose position is kept in a `TraversalStack` and handed
//! to the host as the page token.
//!
//! ## One call, one step
//!
//! - Top frame `Schedule`: on the first visit emit owner and on-call grants,
//!   then fetch one page of rotations. The schedule frame is replaced by a
//!   continuation (if more rotation pages exist) and the page's rotations
//!   are pushed so that the first rotation ends up on top.
//! - Top frame `ScheduleRotation`: drain all member pages, emit one `member`
//!   grant per user and pop the frame.
//!
//! The stack is decoded into a local value and only encoded after every
//! upstream call succeeded. A failed call therefore leaves the caller's
//! token valid for a retry.

use crate::error::{require, ConnectorError, ConnectorResult};
use crate::profile::{insert_non_empty, insert_timestamp};
use crate::syncer::{Listing, ResourceSyncer};
use chrono::{DateTime, Utc};
use rootly_client::{Operation, Schedule, ShiftWindow, UpstreamClient};
use rootly_model::catalog::{
    self, SCHEDULE_MEMBER, SCHEDULE_ON_CALL, SCHEDULE_OWNER, TEAM_ADMIN, TEAM_MEMBER,
};
use rootly_model::{
    Entitlement, Frame, Grant, Profile, Resource, ResourceId, ResourceKind, ResourceTrait,
    ResourceType, TraversalStack,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// Source of the current time, used to pick the on-call window.
pub type Clock = fn() -> DateTime<Utc>;

/// Lists Rootly schedules and resolves their grants incrementally.
pub struct ScheduleSyncer<U: UpstreamClient> {
    client: Arc<U>,
    clock: Clock,
}

impl<U: UpstreamClient> ScheduleSyncer<U> {
    /// Creates a schedule syncer using the system clock.
    pub fn new(client: Arc<U>) -> Self {
        Self {
            client,
            clock: Utc::now,
        }
    }

    /// Sets the clock used for on-call lookups.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Emits owner and on-call grants for a schedule's first visit.
    fn resolve_owners(&self, schedule: &ResourceId) -> ConnectorResult<Vec<Grant>> {
        let owners = self
            .client
            .get_schedule_owners(&schedule.id)
            .map_err(ConnectorError::upstream(Operation::GetSchedule))?;

        let window = ShiftWindow::current((self.clock)());
        let on_call = self
            .client
            .list_on_call_user_ids(&schedule.id, &window)
            .map_err(ConnectorError::upstream(Operation::ListCurrentShifts))?;

        let mut grants = Vec::new();
        if let Some(user_id) = owners.user_id.filter(|id| !id.is_empty()) {
            grants.push(Grant::new(schedule, SCHEDULE_OWNER, ResourceId::user(user_id)));
        }
        for team_id in owners.team_ids.into_iter().filter(|id| !id.is_empty()) {
            grants.push(
                Grant::new(schedule, SCHEDULE_OWNER, ResourceId::team(team_id))
                    .expandable_into(&[TEAM_MEMBER, TEAM_ADMIN]),
            );
        }
        for user_id in on_call.into_iter().filter(|id| !id.is_empty()) {
            grants.push(Grant::new(schedule, SCHEDULE_ON_CALL, ResourceId::user(user_id)));
        }
        Ok(grants)
    }

    /// Advances a schedule frame by one rotation page.
    fn step_schedule(
        &self,
        schedule: &ResourceId,
        stack: &mut TraversalStack,
        rotation_cursor: &str,
        owners_resolved: bool,
    ) -> ConnectorResult<Vec<Grant>> {
        let grants = if owners_resolved {
            Vec::new()
        } else {
            self.resolve_owners(schedule)?
        };

        let page = self
            .client
            .list_schedule_rotations(&schedule.id, rotation_cursor)
            .map_err(ConnectorError::upstream(Operation::ListScheduleRotations))?;
        for rotation_id in &page.items {
            require(rotation_id, "rotation_id")?;
        }

        stack.pop();
        if page.has_more() {
            stack.push(Frame::schedule_continuation(&schedule.id, page.next_cursor));
        }
        // Reverse so the first rotation of the page is on top.
        for rotation_id in page.items.into_iter().rev() {
            stack.push(Frame::rotation(&schedule.id, rotation_id));
        }
        Ok(grants)
    }

    /// Drains a rotation's members and pops its frame.
    fn step_rotation(
        &self,
        schedule: &ResourceId,
        stack: &mut TraversalStack,
        rotation_id: &str,
    ) -> ConnectorResult<Vec<Grant>> {
        let mut user_ids = Vec::new();
        let mut cursor = String::new();
        loop {
            let page = self
                .client
                .list_rotation_members(rotation_id, &cursor)
                .map_err(ConnectorError::upstream(Operation::ListRotationMembers))?;
            trace!(rotation_id, count = page.items.len(), "fetched rotation members");
            let has_more = page.has_more();
            user_ids.extend(page.items.into_iter().filter(|id| !id.is_empty()));
            if !has_more {
                break;
            }
            cursor = page.next_cursor;
        }

        stack.pop();
        Ok(user_ids
            .into_iter()
            .map(|user_id| Grant::new(schedule, SCHEDULE_MEMBER, ResourceId::user(user_id)))
            .collect())
    }
}

fn schedule_resource(schedule: &Schedule, parent: Option<&ResourceId>) -> Resource {
    let mut profile = Profile::new();
    insert_non_empty(&mut profile, "schedule_id", &schedule.id);
    insert_non_empty(&mut profile, "name", &schedule.name);
    insert_non_empty(&mut profile, "description", &schedule.description);
    insert_timestamp(&mut profile, "created_at", &schedule.created_at);
    insert_timestamp(&mut profile, "updated_at", &schedule.updated_at);

    Resource::new(ResourceId::schedule(&schedule.id), &schedule.name, ResourceTrait::Group)
        .with_parent(parent.cloned())
        .with_profile(profile)
}

/// Decodes the token, seeding a fresh traversal for the empty token.
fn load_stack(schedule: &ResourceId, token: &str) -> ConnectorResult<TraversalStack> {
    if token.is_empty() {
        return Ok(TraversalStack::seeded(Frame::schedule(&schedule.id)));
    }

    let stack = TraversalStack::decode(token)?;
    let foreign = stack
        .frames()
        .iter()
        .map(Frame::schedule_id)
        .find(|schedule_id| *schedule_id != schedule.id);
    if let Some(other) = foreign {
        return Err(ConnectorError::MalformedToken(format!(
            "token belongs to schedule {other}, not {}",
            schedule.id
        )));
    }
    Ok(stack)
}

impl<U: UpstreamClient> ResourceSyncer for ScheduleSyncer<U> {
    fn resource_type(&self) -> &'static ResourceType {
        &catalog::SCHEDULE
    }

    fn list(&self, parent: Option<&ResourceId>, token: &str) -> ConnectorResult<Listing<Resource>> {
        debug!(resource_type = "schedule", token, "listing resources");
        let page = self
            .client
            .list_schedules(token)
            .map_err(ConnectorError::upstream(Operation::ListSchedules))?;
        let resources = page.items.iter().map(|s| schedule_resource(s, parent)).collect();
        Ok(Listing::new(resources, page.next_cursor))
    }

    fn entitlements(
        &self,
        resource: &Resource,
        _token: &str,
    ) -> ConnectorResult<Listing<Entitlement>> {
        let name = &resource.display_name;
        Ok(Listing::done(vec![
            Entitlement::assignment(resource, SCHEDULE_OWNER)
                .with_display_name(format!("{name} schedule owner"))
                .with_description(format!("Owner of the {name} schedule in Rootly"))
                .with_grantable_to(&[ResourceKind::User, ResourceKind::Team]),
            Entitlement::assignment(resource, SCHEDULE_MEMBER)
                .with_display_name(format!("{name} schedule member"))
                .with_description(format!("Member of a rotation in the {name} schedule"))
                .with_grantable_to(&[ResourceKind::User]),
            Entitlement::assignment(resource, SCHEDULE_ON_CALL)
                .with_display_name(format!("{name} schedule on-call member"))
                .with_description(format!("Currently on call for the {name} schedule"))
                .with_grantable_to(&[ResourceKind::User]),
        ]))
    }

    fn grants(&self, resource: &Resource, token: &str) -> ConnectorResult<Listing<Grant>> {
        debug!(resource = %resource.id, token, "listing schedule grants");
        let schedule = &resource.id;
        require(&schedule.id, "schedule_id")?;

        let mut stack = load_stack(schedule, token)?;
        let grants = match stack.peek().cloned() {
            Some(Frame::Schedule {
                rotation_cursor,
                owners_resolved,
                ..
            }) => self.step_schedule(schedule, &mut stack, &rotation_cursor, owners_resolved)?,
            Some(Frame::ScheduleRotation { rotation_id, .. }) => {
                self.step_rotation(schedule, &mut stack, &rotation_id)?
            }
            None => Vec::new(),
        };

        let next_token = stack.encode()?;
        debug!(
            resource = %schedule,
            grants = grants.len(),
            depth = stack.len(),
            "schedule grant step finished"
        );
        Ok(Listing::new(grants, next_token))
    }
}
