//! Configuration structures
//!
//! Resolved once at startup by the infra loader and shared read-only
//! across the application.

use serde::{Deserialize, Serialize};

/// Credentials and redirect target for one OAuth client registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Space-separated scope string requested at authorization time
    pub scopes: String,
}

/// Provider endpoint URLs
///
/// Defaults point at the live Google/Zoom services; tests substitute
/// local mock servers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEndpoints {
    pub google_auth_url: String,
    pub google_token_url: String,
    pub google_userinfo_url: String,
    pub google_calendar_base_url: String,
    pub zoom_auth_url: String,
    pub zoom_token_url: String,
    pub zoom_api_base_url: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            google_auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            google_token_url: "https://oauth2.googleapis.com/token".to_string(),
            google_userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
            google_calendar_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            zoom_auth_url: "https://zoom.us/oauth/authorize".to_string(),
            zoom_token_url: "https://zoom.us/oauth/token".to_string(),
            zoom_api_base_url: "https://api.zoom.us/v2".to_string(),
        }
    }
}

/// SQLite database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "schedlink.db".to_string(),
            pool_size: 4,
        }
    }
}

/// Optional post-commit notification to the host application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostNotifyConfig {
    pub save_token_url: String,
    pub api_key: Option<String>,
}

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub google: OAuthClientConfig,
    pub zoom: OAuthClientConfig,
    /// Secret key for signing OAuth state tokens
    pub state_secret: String,
    /// Origin of the host application, used as the redirect fallback
    pub app_base_url: String,
    /// When set, all post-connect redirects land here regardless of state
    pub fixed_return_url: Option<String>,
    pub host_notify: Option<HostNotifyConfig>,
    pub database: DatabaseConfig,
    pub endpoints: ProviderEndpoints,
    pub bind_addr: String,
}
