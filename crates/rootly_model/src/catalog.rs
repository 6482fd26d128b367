//! Static resource catalog.
//!
//! Describes the four synchronized resource kinds and the entitlement slugs
//! each of them exposes. Users and secrets expose no entitlements.

use crate::resource::ResourceKind;
use serde::Serialize;

/// Schedule ownership.
pub const SCHEDULE_OWNER: &str = "owner";
/// Schedule rotation membership.
pub const SCHEDULE_MEMBER: &str = "member";
/// Current on-call membership.
pub const SCHEDULE_ON_CALL: &str = "on-call";
/// Team administration.
pub const TEAM_ADMIN: &str = "admin";
/// Team membership.
pub const TEAM_MEMBER: &str = "member";

/// The shape category of a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitKind {
    /// Principals.
    User,
    /// Groups of principals.
    Group,
    /// Credentials.
    Secret,
}

/// Definition of a synchronized resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceType {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Shape category.
    pub trait_kind: TraitKind,
    /// Entitlement slugs exposed by resources of this type.
    pub entitlements: &'static [&'static str],
}

impl ResourceType {
    /// Returns the type definition for a kind.
    pub fn of(kind: ResourceKind) -> &'static ResourceType {
        match kind {
            ResourceKind::User => &USER,
            ResourceKind::Team => &TEAM,
            ResourceKind::Schedule => &SCHEDULE,
            ResourceKind::Secret => &SECRET,
        }
    }

    /// Returns all type definitions, in sync order.
    pub fn all() -> [&'static ResourceType; 4] {
        ResourceKind::ALL.map(ResourceType::of)
    }

    /// Returns the stable type identifier.
    pub fn id(&self) -> &'static str {
        self.kind.id()
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        self.kind.display_name()
    }

    /// Returns true if the host can skip entitlement and grant listing.
    pub fn skip_entitlements_and_grants(&self) -> bool {
        self.entitlements.is_empty()
    }
}

/// Rootly users.
pub const USER: ResourceType = ResourceType {
    kind: ResourceKind::User,
    trait_kind: TraitKind::User,
    entitlements: &[],
};

/// Rootly teams.
pub const TEAM: ResourceType = ResourceType {
    kind: ResourceKind::Team,
    trait_kind: TraitKind::Group,
    entitlements: &[TEAM_ADMIN, TEAM_MEMBER],
};

/// Rootly on-call schedules.
pub const SCHEDULE: ResourceType = ResourceType {
    kind: ResourceKind::Schedule,
    trait_kind: TraitKind::Group,
    entitlements: &[SCHEDULE_OWNER, SCHEDULE_MEMBER, SCHEDULE_ON_CALL],
};

/// Rootly secrets.
pub const SECRET: ResourceType = ResourceType {
    kind: ResourceKind::Secret,
    trait_kind: TraitKind::Secret,
    entitlements: &[],
};
