//! # Rootly Connector
//!
//! Resource syncers and resumable grant traversal for the Rootly access sync.
//!
//! This crate provides:
//! - One `ResourceSyncer` per resource type (users, teams, secrets, schedules)
//! - Incremental schedule grant resolution driven by a page token
//! - `Connector` metadata and credential validation
//! - `SyncDriver`, a host loop that drains every syncer into a `Snapshot`
//!
//! ## Key Invariants
//!
//! - The page token is the only state carried between calls
//! - A failed call never invalidates the token it was given
//! - Owner and on-call grants are emitted once per schedule traversal
//! - Rotations are visited in upstream page order

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod connector;
mod driver;
mod error;
mod profile;
mod schedules;
mod secrets;
mod syncer;
mod teams;
mod users;

pub use connector::{Connector, ConnectorMetadata};
pub use driver::{Snapshot, SyncDriver, SyncStats, DEFAULT_MAX_PAGES};
pub use error::{ConnectorError, ConnectorResult};
pub use schedules::{Clock, ScheduleSyncer};
pub use secrets::SecretSyncer;
pub use syncer::{Listing, ResourceSyncer};
pub use teams::TeamSyncer;
pub use users::UserSyncer;
