//! Google OAuth client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use schedlink_core::ports::OAuthProviderClient;
use schedlink_domain::{
    OAuthClientConfig, Provider, ProviderIdentity, Result, SchedlinkError, TokenGrant,
};

use crate::errors::InfraError;

/// Google OAuth client
///
/// Google expects client credentials inside the form body and needs
/// `access_type=offline&prompt=consent` at authorization time to hand out
/// a refresh token on every connect.
pub struct GoogleOAuthClient {
    http: Client,
    config: OAuthClientConfig,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
}

impl GoogleOAuthClient {
    pub fn new(
        http: Client,
        config: OAuthClientConfig,
        auth_url: String,
        token_url: String,
        userinfo_url: String,
    ) -> Self {
        Self { http, config, auth_url, token_url, userinfo_url }
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenGrant> {
        let response = self
            .http
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(SchedlinkError::Provider(format!(
                "google token endpoint returned {status}: {body}"
            )));
        }

        let token: GoogleTokenResponse =
            response.json().await.map_err(|e| {
                SchedlinkError::Provider(format!("unreadable google token response: {e}"))
            })?;

        Ok(TokenGrant {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            scope: token.scope,
        })
    }
}

#[async_trait]
impl OAuthProviderClient for GoogleOAuthClient {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn authorization_url(&self, state: &str) -> Result<String> {
        Ok(format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}&access_type=offline&prompt=consent&include_granted_scopes=true",
            self.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&self.config.scopes),
            urlencoding::encode(state),
        ))
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        self.token_request(&[
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ])
        .await
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant> {
        self.token_request(&[
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            return Err(SchedlinkError::Provider(format!(
                "google userinfo returned {}",
                response.status()
            )));
        }

        let info: GoogleUserInfo = response.json().await.map_err(|e| {
            SchedlinkError::Provider(format!("unreadable google userinfo response: {e}"))
        })?;

        Ok(ProviderIdentity { email: info.email, account_id: info.sub })
    }
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: Option<String>,
    email: Option<String>,
}
