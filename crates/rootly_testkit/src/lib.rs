//! # Rootly Testkit
//!
//! Test utilities for the Rootly access sync.
//!
//! This crate provides:
//! - Builders for upstream users, teams, secrets and schedules
//! - `FixtureServer`, an in-process JSON:API server for loopback tests
//! - Property-based test generators for traversal stacks
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rootly_testkit::prelude::*;
//!
//! #[test]
//! fn lists_users_over_loopback() {
//!     let server = FixtureServer::new().with_user(user("96913", "Ada", "ada@example.com"));
//!     let client = loopback_client(server);
//!     // ... drive the client
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod server;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::server::*;
}

pub use fixtures::*;
pub use generators::*;
pub use server::*;
