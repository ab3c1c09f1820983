//! `appstats` Core Library
//!
//! Shared functionality for `appstats` components:
//! - Configuration resolution and hierarchy
//! - Database pool construction and error types
//! - Tracing initialisation
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
