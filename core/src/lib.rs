//! Session-oriented client for a hierarchical content-catalog web service.
//!
//! # Overview
//! A `SessionBuilder` bound to a named environment (or an explicit base URL)
//! performs the credential exchange and returns an authenticated `Session`.
//! The session then offers item CRUD, file uploads (batch or per-file, with
//! optional scrape-on-upload), per-item ACL management, and directed item
//! relationships, all over the catalog's JSON REST contract.
//!
//! # Design
//! - `Api` is stateless: endpoints are split into `build_*` (produces an
//!   `HttpRequest` as plain data) and `parse_*` (consumes an
//!   `HttpResponse`), so every endpoint is unit-testable without a server.
//! - `Transport` owns the only I/O: a cookie-holding ureq agent with a
//!   bounded retry policy for idempotent reads.
//! - Multi-step operations (upload-and-upsert) are not transactional;
//!   callers compensate after partial failure.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

mod acl;
mod api;
pub mod error;
pub mod http;
mod items;
mod relations;
pub mod session;
mod transport;
pub mod types;
mod upload;

pub use error::Error;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{Environment, Session, SessionBuilder};
pub use types::{
    role_token, user_token, FileInfo, Item, ItemFields, Permissions, QueryOptions, ReadAccess,
    RelatedItemLink, SearchQuery, SearchResult, WriteAccess,
};
