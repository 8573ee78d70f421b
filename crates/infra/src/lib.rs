//! # Schedlink Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite credential store
//! - Google/Zoom OAuth provider clients
//! - Host application webhook notifier
//! - Environment configuration loader
//!
//! ## Architecture
//! - Implements traits defined in `schedlink-core`
//! - Depends on `schedlink-domain` and `schedlink-core`
//! - Contains all "impure" code (I/O, HTTP, database)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod notify;
pub mod providers;

// Re-export commonly used items
pub use database::{DbManager, SqliteCredentialStore};
pub use errors::InfraError;
pub use http::build_http_client;
pub use notify::WebhookHostNotifier;
pub use providers::{GoogleOAuthClient, ZoomOAuthClient};
