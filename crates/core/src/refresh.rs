//! Transparent access-token refresh
//!
//! Consumers call [`TokenRefresher::get_access_token`] before every provider
//! API call; a stored token that is missing or inside the expiry margin is
//! refreshed in place. Refreshes for the same `(employee, provider)` key are
//! serialized so concurrent callers trigger at most one provider round trip.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use schedlink_domain::{IntegrationPatch, IntegrationRecord, Provider, Result, SchedlinkError};

use crate::ports::{CredentialStore, OAuthProviderClient};

/// Tokens within this many seconds of expiry are treated as stale
pub const EXPIRY_MARGIN_SECS: i64 = 60;

type RefreshKey = (String, Provider);

pub struct TokenRefresher {
    store: Arc<dyn CredentialStore>,
    locks: DashMap<RefreshKey, Arc<Mutex<()>>>,
}

impl TokenRefresher {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            locks: DashMap::new(),
        }
    }

    /// Return a usable access token for the key, refreshing if needed
    #[instrument(skip(self, client), fields(provider = %client.provider()))]
    pub async fn get_access_token(
        &self,
        client: &dyn OAuthProviderClient,
        employee_id: &str,
    ) -> Result<String> {
        let provider = client.provider();
        let record = self.load_connected(employee_id, provider).await?;

        if let Some(token) = fresh_token(&record) {
            debug!("stored access token still fresh");
            return Ok(token);
        }

        let lock = self
            .locks
            .entry((employee_id.to_string(), provider))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Re-read under the lock: a concurrent caller may have refreshed
        // while we waited.
        let record = self.load_connected(employee_id, provider).await?;
        if let Some(token) = fresh_token(&record) {
            debug!("token refreshed by a concurrent caller");
            return Ok(token);
        }

        let refresh_token = record.refresh_token.clone().ok_or_else(|| {
            SchedlinkError::NotConnected(format!("{employee_id}/{provider} has no refresh token"))
        })?;

        let grant = client.refresh_access_token(&refresh_token).await?;
        let patch = IntegrationPatch {
            access_token: Some(grant.access_token.clone()),
            // Providers that do not rotate omit the refresh token; keep ours.
            refresh_token: grant.refresh_token,
            expires_at: Some(Utc::now().timestamp() + grant.expires_in),
            scopes: grant.scope,
            ..Default::default()
        };
        self.store.upsert(employee_id, provider, &patch).await?;

        info!(%provider, "access token refreshed");
        Ok(grant.access_token)
    }

    async fn load_connected(
        &self,
        employee_id: &str,
        provider: Provider,
    ) -> Result<IntegrationRecord> {
        let record = self.store.get(employee_id, provider).await?.ok_or_else(|| {
            SchedlinkError::NotConnected(format!("{employee_id}/{provider} is not connected"))
        })?;
        if record.refresh_token.is_none() {
            return Err(SchedlinkError::NotConnected(format!(
                "{employee_id}/{provider} has no refresh token"
            )));
        }
        Ok(record)
    }
}

/// The stored token, when present and outside the expiry margin
fn fresh_token(record: &IntegrationRecord) -> Option<String> {
    let token = record.access_token.clone()?;
    let expires_at = record.expires_at?;
    if Utc::now().timestamp() >= expires_at - EXPIRY_MARGIN_SECS {
        return None;
    }
    Some(token)
}
