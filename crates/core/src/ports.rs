//! Port interfaces implemented by the infrastructure layer

use async_trait::async_trait;

use schedlink_domain::{
    IntegrationPatch, IntegrationRecord, Provider, ProviderIdentity, Result, TokenGrant,
};

/// Durable store of per-(employee, provider) OAuth credentials
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the record for a key, if any
    async fn get(&self, employee_id: &str, provider: Provider) -> Result<Option<IntegrationRecord>>;

    /// Atomically insert-or-update the record for a key
    ///
    /// `None` patch fields leave stored values unchanged; `updated_at` is
    /// always refreshed.
    async fn upsert(
        &self,
        employee_id: &str,
        provider: Provider,
        patch: &IntegrationPatch,
    ) -> Result<IntegrationRecord>;
}

/// Outbound OAuth operations against one provider
#[async_trait]
pub trait OAuthProviderClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Build the authorization URL the browser is redirected to
    fn authorization_url(&self, state: &str) -> Result<String>;

    /// Exchange an authorization code for tokens
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant>;

    /// Obtain a fresh access token from a refresh token
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant>;

    /// Look up the connected account's identity (best-effort)
    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity>;
}

/// Post-commit notification hook towards the host application
#[async_trait]
pub trait HostNotifier: Send + Sync {
    /// Called after tokens have been persisted; failures must not affect
    /// the committed record.
    async fn token_saved(&self, record: &IntegrationRecord) -> Result<()>;
}
