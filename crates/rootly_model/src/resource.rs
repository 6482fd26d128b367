//! Resources synchronized from Rootly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Free-form display attributes attached to a resource.
pub type Profile = BTreeMap<String, serde_json::Value>;

/// The category of a synchronized entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A Rootly user.
    User,
    /// A Rootly team (a "group" upstream).
    Team,
    /// An on-call schedule.
    Schedule,
    /// A stored secret.
    Secret,
}

impl ResourceKind {
    /// All kinds, in sync order.
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::User,
        ResourceKind::Team,
        ResourceKind::Secret,
        ResourceKind::Schedule,
    ];

    /// Returns the stable type identifier.
    pub fn id(&self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Team => "team",
            ResourceKind::Schedule => "schedule",
            ResourceKind::Secret => "secret",
        }
    }

    /// Returns the human readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::User => "User",
            ResourceKind::Team => "Team",
            ResourceKind::Schedule => "Schedule",
            ResourceKind::Secret => "Secret",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Identifies a resource by kind and upstream id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Upstream identifier.
    pub id: String,
}

impl ResourceId {
    /// Creates a new resource id.
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Creates a user resource id.
    pub fn user(id: impl Into<String>) -> Self {
        Self::new(ResourceKind::User, id)
    }

    /// Creates a team resource id.
    pub fn team(id: impl Into<String>) -> Self {
        Self::new(ResourceKind::Team, id)
    }

    /// Creates a schedule resource id.
    pub fn schedule(id: impl Into<String>) -> Self {
        Self::new(ResourceKind::Schedule, id)
    }

    /// Creates a secret resource id.
    pub fn secret(id: impl Into<String>) -> Self {
        Self::new(ResourceKind::Secret, id)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Account status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// The account can sign in.
    Enabled,
    /// The account is disabled.
    Disabled,
}

/// User-shaped resource details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTrait {
    /// Primary email address.
    pub email: String,
    /// Account status.
    pub status: UserStatus,
    /// Creation timestamp (RFC 3339), when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Secret-shaped resource details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretTrait {
    /// Creation timestamp (RFC 3339), when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// The shape a resource takes in the access graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ResourceTrait {
    /// A principal.
    User(UserTrait),
    /// A group of principals.
    Group,
    /// A credential.
    Secret(SecretTrait),
}

/// A synchronized resource.
///
/// Resources are created by a List call and are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource identifier.
    pub id: ResourceId,
    /// Display name.
    pub display_name: String,
    /// Parent resource, if the host listed this resource under one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ResourceId>,
    /// Resource shape.
    #[serde(rename = "trait")]
    pub shape: ResourceTrait,
    /// Display-only attributes.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub profile: Profile,
}

impl Resource {
    /// Creates a new resource.
    pub fn new(id: ResourceId, display_name: impl Into<String>, shape: ResourceTrait) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            parent_id: None,
            shape,
            profile: Profile::new(),
        }
    }

    /// Sets the parent resource.
    pub fn with_parent(mut self, parent_id: Option<ResourceId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// Sets the profile.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Returns the resource kind.
    pub fn kind(&self) -> ResourceKind {
        self.id.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_identifiers() {
        assert_eq!(ResourceKind::User.id(), "user");
        assert_eq!(ResourceKind::Schedule.display_name(), "Schedule");
        assert_eq!(ResourceKind::Team.to_string(), "team");
    }

    #[test]
    fn resource_id_display() {
        assert_eq!(ResourceId::schedule("S1").to_string(), "schedule:S1");
        assert_eq!(ResourceId::user("96913").to_string(), "user:96913");
    }

    #[test]
    fn resource_builder() {
        let parent = ResourceId::team("T1");
        let resource = Resource::new(ResourceId::schedule("S1"), "Primary", ResourceTrait::Group)
            .with_parent(Some(parent.clone()));

        assert_eq!(resource.kind(), ResourceKind::Schedule);
        assert_eq!(resource.parent_id, Some(parent));
        assert!(resource.profile.is_empty());
    }

    #[test]
    fn resource_serializes_trait_shape() {
        let resource = Resource::new(
            ResourceId::user("1"),
            "Sam",
            ResourceTrait::User(UserTrait {
                email: "sam@example.com".into(),
                status: UserStatus::Enabled,
                created_at: None,
            }),
        );
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["trait"]["shape"], "user");
        assert_eq!(json["trait"]["status"], "enabled");
        assert!(json.get("parent_id").is_none());
    }
}
