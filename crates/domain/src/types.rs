//! Common data types used throughout the application

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SchedlinkError;

/// OAuth provider an employee can connect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Zoom,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Zoom => "zoom",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = SchedlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Provider::Google),
            "zoom" => Ok(Provider::Zoom),
            other => Err(SchedlinkError::InvalidInput(format!(
                "unknown provider: {other}"
            ))),
        }
    }
}

/// Stored OAuth credentials for one employee + provider pair
///
/// Timestamps are epoch seconds; `expires_at` is the absolute expiry of
/// `access_token` as reported by the provider at grant time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationRecord {
    pub employee_id: String,
    pub provider: Provider,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
    pub provider_account_email: Option<String>,
    pub provider_account_id: Option<String>,
    pub scopes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl IntegrationRecord {
    /// Get expiry as DateTime<Utc>
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

/// Partial update applied to an [`IntegrationRecord`]
///
/// `None` fields leave the stored value untouched; in particular an absent
/// `refresh_token` never clears a stored one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrationPatch {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
    pub provider_account_email: Option<String>,
    pub provider_account_id: Option<String>,
    pub scopes: Option<String>,
}

/// Token material returned by a provider token endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Lifetime of `access_token` in seconds
    pub expires_in: i64,
    pub scope: Option<String>,
}

/// Account identity fetched from a provider userinfo endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderIdentity {
    pub email: Option<String>,
    pub account_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_round_trips_through_str() {
        assert_eq!("google".parse::<Provider>().unwrap(), Provider::Google);
        assert_eq!("zoom".parse::<Provider>().unwrap(), Provider::Zoom);
        assert_eq!(Provider::Google.as_str(), "google");
    }

    #[test]
    fn unknown_provider_is_invalid_input() {
        let err = "teams".parse::<Provider>().unwrap_err();
        assert!(matches!(err, SchedlinkError::InvalidInput(_)));
    }

    #[test]
    fn provider_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Provider::Zoom).unwrap(), "\"zoom\"");
    }

    #[test]
    fn default_patch_changes_nothing() {
        let patch = IntegrationPatch::default();
        assert!(patch.access_token.is_none());
        assert!(patch.refresh_token.is_none());
        assert!(patch.expires_at.is_none());
    }
}
