//! Shared outbound HTTP client construction

use std::time::Duration;

use reqwest::Client;
use schedlink_domain::{Result, SchedlinkError};

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Build the reqwest client used for all provider and host-app calls.
///
/// A single client is constructed at startup and cloned into each consumer;
/// reqwest clients share their connection pool across clones.
pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| SchedlinkError::Internal(format!("failed to build HTTP client: {e}")))
}
