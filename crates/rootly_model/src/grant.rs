//! Grants connecting principals to entitlements.

use crate::entitlement::entitlement_id;
use crate::resource::ResourceId;
use serde::{Deserialize, Serialize};

/// Marks a grant whose principal's own entitlements imply this grant.
///
/// The host expands every listed entitlement transitively: holders of those
/// entitlements are treated as holding the granted entitlement too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantExpandable {
    /// Entitlement ids on the principal to expand.
    pub entitlement_ids: Vec<String>,
}

/// An assertion that a principal holds an entitlement on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Resource that owns the entitlement.
    pub resource: ResourceId,
    /// Entitlement slug.
    pub entitlement_slug: String,
    /// Principal holding the entitlement.
    pub principal: ResourceId,
    /// Transitive expansion annotation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expandable: Option<GrantExpandable>,
}

impl Grant {
    /// Creates a plain grant.
    pub fn new(resource: &ResourceId, slug: impl Into<String>, principal: ResourceId) -> Self {
        Self {
            resource: resource.clone(),
            entitlement_slug: slug.into(),
            principal,
            expandable: None,
        }
    }

    /// Annotates the grant as expandable into the given principal entitlements.
    pub fn expandable_into(mut self, principal_slugs: &[&str]) -> Self {
        let entitlement_ids = principal_slugs
            .iter()
            .map(|slug| entitlement_id(&self.principal, slug))
            .collect();
        self.expandable = Some(GrantExpandable { entitlement_ids });
        self
    }

    /// Returns the id of the granted entitlement.
    pub fn entitlement_id(&self) -> String {
        entitlement_id(&self.resource, &self.entitlement_slug)
    }

    /// Returns the stable identifier (`entitlement:principal`).
    pub fn id(&self) -> String {
        format!("{}:{}", self.entitlement_id(), self.principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_grant() {
        let grant = Grant::new(&ResourceId::schedule("S1"), "on-call", ResourceId::user("U2"));
        assert_eq!(grant.entitlement_id(), "schedule:S1:on-call");
        assert_eq!(grant.id(), "schedule:S1:on-call:user:U2");
        assert!(grant.expandable.is_none());
    }

    #[test]
    fn expandable_grant_targets_principal_entitlements() {
        let grant = Grant::new(&ResourceId::schedule("S1"), "owner", ResourceId::team("T1"))
            .expandable_into(&["member", "admin"]);

        let expandable = grant.expandable.unwrap();
        assert_eq!(
            expandable.entitlement_ids,
            vec!["team:T1:member".to_string(), "team:T1:admin".to_string()]
        );
    }
}
