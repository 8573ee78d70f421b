//! Configuration loader
//!
//! Loads application configuration from environment variables, once at
//! startup. Every missing required variable is reported by name in a single
//! error instead of failing one variable at a time.
//!
//! ## Environment Variables
//! Required:
//! - `GOOGLE_OAUTH_CLIENT_ID` / `GOOGLE_OAUTH_CLIENT_SECRET` /
//!   `GOOGLE_OAUTH_REDIRECT_URI`: Google OAuth client registration
//! - `ZOOM_CLIENT_ID` / `ZOOM_CLIENT_SECRET` / `ZOOM_REDIRECT_URI`:
//!   Zoom OAuth client registration
//! - `OAUTH_STATE_SECRET`: HMAC key for state tokens
//! - `APP_BASE_URL`: origin of the host application, redirect fallback
//!
//! Optional:
//! - `APP_RETURN_TO_URL`: fixed post-connect landing URL
//! - `HOST_SAVE_TOKEN_URL` / `HOST_API_KEY`: post-commit webhook
//! - `SCHEDLINK_DB_PATH` (default `schedlink.db`)
//! - `SCHEDLINK_DB_POOL_SIZE` (default 4)
//! - `SCHEDLINK_BIND_ADDR` (default `127.0.0.1:8080`)

use schedlink_domain::{
    Config, DatabaseConfig, HostNotifyConfig, OAuthClientConfig, ProviderEndpoints, Result,
    SchedlinkError,
};

const GOOGLE_SCOPES: &str =
    "openid email https://www.googleapis.com/auth/calendar";

/// Load configuration from environment variables
///
/// # Errors
/// Returns `SchedlinkError::Config` naming every missing required variable.
pub fn load_from_env() -> Result<Config> {
    let mut missing: Vec<&'static str> = Vec::new();
    let mut require = |key: &'static str| -> String {
        match std::env::var(key) {
            Ok(value) if !value.trim().is_empty() => value,
            _ => {
                missing.push(key);
                String::new()
            }
        }
    };

    let google = OAuthClientConfig {
        client_id: require("GOOGLE_OAUTH_CLIENT_ID"),
        client_secret: require("GOOGLE_OAUTH_CLIENT_SECRET"),
        redirect_uri: require("GOOGLE_OAUTH_REDIRECT_URI"),
        scopes: GOOGLE_SCOPES.to_string(),
    };
    let zoom = OAuthClientConfig {
        client_id: require("ZOOM_CLIENT_ID"),
        client_secret: require("ZOOM_CLIENT_SECRET"),
        redirect_uri: require("ZOOM_REDIRECT_URI"),
        scopes: String::new(),
    };
    let state_secret = require("OAUTH_STATE_SECRET");
    let app_base_url = require("APP_BASE_URL");

    if !missing.is_empty() {
        return Err(SchedlinkError::Config(format!(
            "missing required environment variables: {}",
            missing.join(", ")
        )));
    }

    let host_notify = std::env::var("HOST_SAVE_TOKEN_URL").ok().map(|url| HostNotifyConfig {
        save_token_url: url,
        api_key: std::env::var("HOST_API_KEY").ok(),
    });

    let database = DatabaseConfig {
        path: std::env::var("SCHEDLINK_DB_PATH")
            .unwrap_or_else(|_| DatabaseConfig::default().path),
        pool_size: match std::env::var("SCHEDLINK_DB_POOL_SIZE") {
            Ok(raw) => raw.parse::<u32>().map_err(|e| {
                SchedlinkError::Config(format!("invalid SCHEDLINK_DB_POOL_SIZE: {e}"))
            })?,
            Err(_) => DatabaseConfig::default().pool_size,
        },
    };

    Ok(Config {
        google,
        zoom,
        state_secret,
        app_base_url,
        fixed_return_url: std::env::var("APP_RETURN_TO_URL").ok(),
        host_notify,
        database,
        endpoints: ProviderEndpoints::default(),
        bind_addr: std::env::var("SCHEDLINK_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const REQUIRED: [&str; 8] = [
        "GOOGLE_OAUTH_CLIENT_ID",
        "GOOGLE_OAUTH_CLIENT_SECRET",
        "GOOGLE_OAUTH_REDIRECT_URI",
        "ZOOM_CLIENT_ID",
        "ZOOM_CLIENT_SECRET",
        "ZOOM_REDIRECT_URI",
        "OAUTH_STATE_SECRET",
        "APP_BASE_URL",
    ];

    fn set_all_required() {
        for key in REQUIRED {
            std::env::set_var(key, format!("value-for-{key}"));
        }
    }

    fn clear_all() {
        for key in REQUIRED {
            std::env::remove_var(key);
        }
        for key in [
            "APP_RETURN_TO_URL",
            "HOST_SAVE_TOKEN_URL",
            "HOST_API_KEY",
            "SCHEDLINK_DB_PATH",
            "SCHEDLINK_DB_POOL_SIZE",
            "SCHEDLINK_BIND_ADDR",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn loads_with_all_required_vars() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_all();
        set_all_required();

        let config = load_from_env().expect("config loads");
        assert_eq!(config.google.client_id, "value-for-GOOGLE_OAUTH_CLIENT_ID");
        assert_eq!(config.zoom.client_secret, "value-for-ZOOM_CLIENT_SECRET");
        assert_eq!(config.database.path, "schedlink.db");
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert!(config.fixed_return_url.is_none());
        assert!(config.host_notify.is_none());

        clear_all();
    }

    #[test]
    fn reports_every_missing_variable_at_once() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_all();
        // leave only two of the eight set
        std::env::set_var("GOOGLE_OAUTH_CLIENT_ID", "x");
        std::env::set_var("APP_BASE_URL", "https://host.test");

        let err = load_from_env().unwrap_err();
        match err {
            SchedlinkError::Config(msg) => {
                assert!(msg.contains("GOOGLE_OAUTH_CLIENT_SECRET"));
                assert!(msg.contains("ZOOM_CLIENT_ID"));
                assert!(msg.contains("ZOOM_CLIENT_SECRET"));
                assert!(msg.contains("ZOOM_REDIRECT_URI"));
                assert!(msg.contains("OAUTH_STATE_SECRET"));
                assert!(!msg.contains("APP_BASE_URL"));
            }
            other => panic!("expected config error, got {other:?}"),
        }

        clear_all();
    }

    #[test]
    fn blank_values_count_as_missing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_all();
        set_all_required();
        std::env::set_var("OAUTH_STATE_SECRET", "   ");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, SchedlinkError::Config(msg) if msg.contains("OAUTH_STATE_SECRET")));

        clear_all();
    }

    #[test]
    fn optional_vars_are_picked_up() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_all();
        set_all_required();
        std::env::set_var("APP_RETURN_TO_URL", "https://fixed.test/landing");
        std::env::set_var("HOST_SAVE_TOKEN_URL", "https://host.test/hooks/token");
        std::env::set_var("HOST_API_KEY", "hook-key");
        std::env::set_var("SCHEDLINK_DB_PATH", "/tmp/integrations.db");
        std::env::set_var("SCHEDLINK_DB_POOL_SIZE", "8");

        let config = load_from_env().expect("config loads");
        assert_eq!(config.fixed_return_url.as_deref(), Some("https://fixed.test/landing"));
        let notify = config.host_notify.expect("notify config");
        assert_eq!(notify.save_token_url, "https://host.test/hooks/token");
        assert_eq!(notify.api_key.as_deref(), Some("hook-key"));
        assert_eq!(config.database.path, "/tmp/integrations.db");
        assert_eq!(config.database.pool_size, 8);

        clear_all();
    }

    #[test]
    fn invalid_pool_size_is_a_config_error() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_all();
        set_all_required();
        std::env::set_var("SCHEDLINK_DB_POOL_SIZE", "not-a-number");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, SchedlinkError::Config(msg) if msg.contains("POOL_SIZE")));

        clear_all();
    }
}
