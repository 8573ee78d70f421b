//! Connect service: OAuth authorize + callback orchestration
//!
//! `start` issues the signed state token and hands back the provider
//! authorization URL. `callback` runs the exchange state machine:
//! verify state, resolve the landing URL, exchange the code, enrich with
//! account identity, persist, notify the host app, and build the final
//! browser redirect.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument, warn};
use url::Url;

use schedlink_domain::{IntegrationPatch, Result, SchedlinkError};

use crate::ports::{CredentialStore, HostNotifier, OAuthProviderClient};
use crate::state::{sign_state, verify_state, StatePayload};

/// Result of a successful OAuth callback
#[derive(Debug, Clone)]
pub struct CallbackOutcome {
    /// Where the employee's browser is sent next
    pub redirect_url: String,
    pub employee_id: String,
    pub provider_email: Option<String>,
}

/// Orchestrates the authorize and callback legs of the OAuth flow
pub struct ConnectService {
    store: Arc<dyn CredentialStore>,
    notifier: Option<Arc<dyn HostNotifier>>,
    state_secret: String,
    /// Overrides all state-derived return destinations when set
    fixed_return_url: Option<String>,
}

impl ConnectService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        notifier: Option<Arc<dyn HostNotifier>>,
        state_secret: String,
        fixed_return_url: Option<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            state_secret,
            fixed_return_url,
        }
    }

    /// Begin an OAuth flow: returns the provider authorization URL
    #[instrument(skip(self, client), fields(provider = %client.provider()))]
    pub fn start(
        &self,
        client: &dyn OAuthProviderClient,
        employee_id: &str,
        return_to: Option<&str>,
    ) -> Result<String> {
        if employee_id.trim().is_empty() {
            return Err(SchedlinkError::InvalidInput(
                "employee_id is required".to_string(),
            ));
        }

        let payload = StatePayload::new(employee_id, return_to.unwrap_or(""));
        let state = sign_state(&payload, &self.state_secret)?;
        client.authorization_url(&state)
    }

    /// Complete an OAuth flow from the provider redirect
    ///
    /// `request_origin` is the externally visible origin of this service,
    /// used as the landing fallback when the state carries no usable
    /// destination.
    #[instrument(skip(self, client, code, state), fields(provider = %client.provider()))]
    pub async fn callback(
        &self,
        client: &dyn OAuthProviderClient,
        code: Option<&str>,
        state: Option<&str>,
        request_origin: &str,
    ) -> Result<CallbackOutcome> {
        let code = non_empty(code)
            .ok_or_else(|| SchedlinkError::InvalidInput("missing code".to_string()))?;
        let state = non_empty(state)
            .ok_or_else(|| SchedlinkError::InvalidInput("missing state".to_string()))?;

        let payload = verify_state(state, &self.state_secret)?;
        let return_base = self.resolve_return_url(&payload.return_to, request_origin);

        let grant = client.exchange_code(code).await?;

        // Identity lookup is best-effort: a userinfo outage must not lose
        // the tokens we already hold.
        let identity = match client.fetch_identity(&grant.access_token).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "identity lookup failed, continuing without it");
                Default::default()
            }
        };

        let patch = IntegrationPatch {
            access_token: Some(grant.access_token),
            refresh_token: grant.refresh_token,
            expires_at: Some(Utc::now().timestamp() + grant.expires_in),
            provider_account_email: identity.email.clone(),
            provider_account_id: identity.account_id,
            scopes: grant.scope,
        };

        let record = self
            .store
            .upsert(&payload.employee_id, client.provider(), &patch)
            .await?;

        if let Some(notifier) = &self.notifier {
            // Post-commit hook; the record is already durable.
            if let Err(e) = notifier.token_saved(&record).await {
                error!(error = %e, employee_id = %record.employee_id, "host notification failed");
            }
        }

        let redirect_url = build_redirect_url(
            &return_base,
            client.provider().as_str(),
            &payload.employee_id,
            identity.email.as_deref(),
        )?;

        info!(employee_id = %payload.employee_id, "oauth connection completed");

        Ok(CallbackOutcome {
            redirect_url,
            employee_id: payload.employee_id,
            provider_email: identity.email,
        })
    }

    /// Pick the post-connect landing URL
    ///
    /// Priority: configured fixed URL, then the state's destination coerced
    /// to the canonical landing path on its own origin, then the request
    /// origin's landing path.
    fn resolve_return_url(&self, state_return_to: &str, request_origin: &str) -> String {
        if let Some(fixed) = &self.fixed_return_url {
            return fixed.clone();
        }

        if !state_return_to.is_empty() {
            if let Ok(parsed) = Url::parse(state_return_to) {
                let path = if parsed.path().starts_with("/version-test/") {
                    "/version-test/call"
                } else {
                    "/call"
                };
                return format!("{}{path}", origin_of(&parsed));
            }
        }

        format!("{}/call", request_origin.trim_end_matches('/'))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

fn build_redirect_url(
    base: &str,
    provider: &str,
    employee_id: &str,
    email: Option<&str>,
) -> Result<String> {
    let mut url = Url::parse(base)
        .map_err(|e| SchedlinkError::Internal(format!("invalid return url {base}: {e}")))?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("connected", provider);
        pairs.append_pair(&format!("{provider}_auth"), "ok");
        pairs.append_pair("employee_id", employee_id);
        if let Some(email) = email {
            pairs.append_pair(&format!("{provider}_email"), email);
        }
    }
    Ok(url.into())
}
