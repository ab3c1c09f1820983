//! appstats Server Library
//!
//! Read-only query service over registered applications and their usage
//! events:
//! - Storage accessor over a pooled relational database
//! - HTTP handlers, validation, and JSON error mapping

pub mod http;
pub mod storage;

pub use http::{AppState, build_router};
