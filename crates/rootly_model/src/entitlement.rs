//! Entitlements exposed by resources.

use crate::resource::{Resource, ResourceId, ResourceKind};
use serde::{Deserialize, Serialize};

/// Returns the stable identifier of an entitlement (`kind:id:slug`).
pub fn entitlement_id(resource: &ResourceId, slug: &str) -> String {
    format!("{}:{}", resource, slug)
}

/// A named permission surface on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    /// Resource the entitlement belongs to.
    pub resource: ResourceId,
    /// Entitlement slug (e.g. `owner`).
    pub slug: String,
    /// Display name.
    pub display_name: String,
    /// Description.
    pub description: String,
    /// Resource kinds that can be granted this entitlement.
    pub grantable_to: Vec<ResourceKind>,
}

impl Entitlement {
    /// Creates an assignment entitlement on a resource.
    pub fn assignment(resource: &Resource, slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            resource: resource.id.clone(),
            display_name: slug.clone(),
            slug,
            description: String::new(),
            grantable_to: Vec::new(),
        }
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the grantable kinds.
    pub fn with_grantable_to(mut self, kinds: &[ResourceKind]) -> Self {
        self.grantable_to = kinds.to_vec();
        self
    }

    /// Returns the stable identifier.
    pub fn id(&self) -> String {
        entitlement_id(&self.resource, &self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceTrait;

    #[test]
    fn entitlement_builder() {
        let schedule = Resource::new(ResourceId::schedule("S1"), "Primary", ResourceTrait::Group);
        let ent = Entitlement::assignment(&schedule, "owner")
            .with_display_name("Primary schedule owner")
            .with_grantable_to(&[ResourceKind::User, ResourceKind::Team]);

        assert_eq!(ent.id(), "schedule:S1:owner");
        assert_eq!(ent.display_name, "Primary schedule owner");
        assert_eq!(ent.grantable_to.len(), 2);
    }
}
