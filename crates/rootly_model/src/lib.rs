//! # Rootly Model
//!
//! Access model types and pagination token codec for Rootly sync.
//!
//! This crate provides:
//! - `Resource`, `Entitlement` and `Grant`, the normalized access model
//! - The resource catalog (kinds, traits and entitlement slugs)
//! - `TraversalStack`, the resumable grant traversal state, and its
//!   token codec
//!
//! This is a pure model crate with no I/O operations.
//!
//! ## Key Invariants
//!
//! - An empty traversal stack encodes to the empty token
//! - Tokens produced by `encode` always decode back to the same stack
//! - A schedule appears on a traversal stack at most once

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
mod entitlement;
mod error;
mod grant;
mod resource;
mod traversal;

pub use catalog::{ResourceType, TraitKind};
pub use entitlement::{entitlement_id, Entitlement};
pub use error::{ModelError, ModelResult};
pub use grant::{Grant, GrantExpandable};
pub use resource::{
    Profile, Resource, ResourceId, ResourceKind, ResourceTrait, SecretTrait, UserStatus,
    UserTrait,
};
pub use traversal::{Frame, FrameKind, TraversalStack};
