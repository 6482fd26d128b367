//! JSON:API wire models.
//!
//! Rootly answers every request with a JSON:API document. Only the fields
//! the sync consumes are modelled; everything else is ignored.

use crate::error::ErrorBody;
use crate::upstream::{Schedule, Secret, Team, User};
use serde::Deserialize;

/// A JSON:API top-level document.
#[derive(Debug, Deserialize)]
pub(crate) struct Document<D> {
    pub data: D,
    #[serde(default)]
    pub links: Option<Links>,
    #[serde(default)]
    pub included: Vec<Identified>,
}

impl<D> Document<D> {
    /// Returns the next-page link, or an empty cursor on the last page.
    pub fn next_cursor(&self) -> String {
        self.links
            .as_ref()
            .and_then(|links| links.next.clone())
            .unwrap_or_default()
    }
}

/// Pagination links.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Links {
    #[serde(default)]
    pub next: Option<String>,
}

/// A JSON:API resource object.
#[derive(Debug, Deserialize)]
pub(crate) struct ResourceObject<A> {
    pub id: String,
    pub attributes: A,
}

/// A resource object reduced to its identity.
#[derive(Debug, Deserialize)]
pub(crate) struct Identified {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A JSON:API error document.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDocument {
    #[serde(default)]
    pub errors: Vec<ErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserAttributes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub slack_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TeamAttributes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub user_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub admin_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SecretAttributes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScheduleAttributes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_user_id: Option<i64>,
    #[serde(default)]
    pub owner_group_ids: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RotationUserAttributes {
    pub user_id: i64,
}

fn ids(values: Option<Vec<i64>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .map(|id| id.to_string())
        .collect()
}

impl From<ResourceObject<UserAttributes>> for User {
    fn from(object: ResourceObject<UserAttributes>) -> Self {
        let a = object.attributes;
        User {
            id: object.id,
            name: a.name.unwrap_or_default(),
            email: a.email.unwrap_or_default(),
            full_name: a.full_name.unwrap_or_default(),
            slack_id: a.slack_id.unwrap_or_default(),
            phone: a.phone.unwrap_or_default(),
            created_at: a.created_at.unwrap_or_default(),
            updated_at: a.updated_at.unwrap_or_default(),
        }
    }
}

impl From<ResourceObject<TeamAttributes>> for Team {
    fn from(object: ResourceObject<TeamAttributes>) -> Self {
        let a = object.attributes;
        Team {
            id: object.id,
            name: a.name.unwrap_or_default(),
            description: a.description.unwrap_or_default(),
            member_ids: ids(a.user_ids),
            admin_ids: ids(a.admin_ids),
            created_at: a.created_at.unwrap_or_default(),
            updated_at: a.updated_at.unwrap_or_default(),
        }
    }
}

impl From<ResourceObject<SecretAttributes>> for Secret {
    fn from(object: ResourceObject<SecretAttributes>) -> Self {
        let a = object.attributes;
        Secret {
            id: object.id,
            name: a.name.unwrap_or_default(),
            created_at: a.created_at.unwrap_or_default(),
            updated_at: a.updated_at.unwrap_or_default(),
        }
    }
}

impl From<ResourceObject<ScheduleAttributes>> for Schedule {
    fn from(object: ResourceObject<ScheduleAttributes>) -> Self {
        let a = object.attributes;
        Schedule {
            id: object.id,
            name: a.name.unwrap_or_default(),
            description: a.description.unwrap_or_default(),
            owner_user_id: a.owner_user_id.map(|id| id.to_string()),
            owner_team_ids: a.owner_group_ids.unwrap_or_default(),
            created_at: a.created_at.unwrap_or_default(),
            updated_at: a.updated_at.unwrap_or_default(),
        }
    }
}
