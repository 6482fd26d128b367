//! # Rootly Client
//!
//! Upstream client for the Rootly JSON:API.
//!
//! This crate provides:
//! - `UpstreamClient`, the paginated read surface the sync consumes
//! - `RootlyClient`, its HTTP implementation with retries and bearer auth
//! - `MockUpstream`, an in-memory implementation for tests
//!
//! ## Transport
//!
//! The HTTP library is pluggable through the `HttpClient` trait. The
//! `LoopbackClient` routes requests to an in-process `LoopbackServer`,
//! which lets the full request path run in tests without a network.
//!
//! ## Pagination
//!
//! Every list operation takes an opaque cursor. The empty cursor requests
//! the first page; an empty `next_cursor` marks the last one.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod http;
mod mock;
mod models;
mod upstream;

pub use config::{ClientConfig, RetryConfig, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
pub use error::{ClientError, ClientResult, ErrorBody};
pub use http::{
    HttpClient, HttpRequest, HttpResponse, LoopbackClient, LoopbackServer, RootlyClient,
    JSON_API_MEDIA_TYPE,
};
pub use mock::MockUpstream;
pub use upstream::{
    Operation, Page, Schedule, ScheduleOwners, Secret, ShiftWindow, Team, UpstreamClient, User,
};
