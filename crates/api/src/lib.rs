//! # Schedlink API
//!
//! HTTP surface of the scheduling-integration backend: OAuth start/callback
//! routes per provider plus the thin free/busy, calendar-event and
//! Zoom-meeting proxies built on the token refresher.

pub mod context;
pub mod error;
pub mod routes;

pub use context::{router, AppContext};
pub use error::ApiError;
