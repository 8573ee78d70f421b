//! Zoom OAuth client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use schedlink_core::ports::OAuthProviderClient;
use schedlink_domain::{
    OAuthClientConfig, Provider, ProviderIdentity, Result, SchedlinkError, TokenGrant,
};

use crate::errors::InfraError;

/// Zoom OAuth client
///
/// Zoom authenticates the client with HTTP Basic auth on the token endpoint
/// and rotates the refresh token on every refresh.
pub struct ZoomOAuthClient {
    http: Client,
    config: OAuthClientConfig,
    auth_url: String,
    token_url: String,
    api_base_url: String,
}

impl ZoomOAuthClient {
    pub fn new(
        http: Client,
        config: OAuthClientConfig,
        auth_url: String,
        token_url: String,
        api_base_url: String,
    ) -> Self {
        Self { http, config, auth_url, token_url, api_base_url }
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenGrant> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(form)
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(SchedlinkError::Provider(format!(
                "zoom token endpoint returned {status}: {body}"
            )));
        }

        let token: ZoomTokenResponse = response.json().await.map_err(|e| {
            SchedlinkError::Provider(format!("unreadable zoom token response: {e}"))
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
impl OAuthProviderClient for ZoomOAuthClient {
    fn provider(&self) -> Provider {
        Provider::Zoom
    }

    fn authorization_url(&self, state: &str) -> Result<String> {
        Ok(format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&state={}",
            self.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(state),
        ))
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ])
        .await
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity> {
        let response = self
            .http
            .get(format!("{}/users/me", self.api_base_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            return Err(SchedlinkError::Provider(format!(
                "zoom users/me returned {}",
                response.status()
            )));
        }

        let user: ZoomUser = response.json().await.map_err(|e| {
            SchedlinkError::Provider(format!("unreadable zoom user response: {e}"))
        })?;

        Ok(ProviderIdentity { email: user.email, account_id: user.id })
    }
}

#[derive(Debug, Deserialize)]
struct ZoomTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ZoomUser {
    id: Option<String>,
    email: Option<String>,
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server_uri: &str) -> ZoomOAuthClient {
        ZoomOAuthClient::new(
            Client::new(),
            OAuthClientConfig {
                client_id: "zoom-client".to_string(),
                client_secret: "zoom-secret".to_string(),
                redirect_uri: "https://self.test/api/auth/zoom/callback".to_string(),
                scopes: String::new(),
            },
            format!("{server_uri}/oauth/authorize"),
            format!("{server_uri}/oauth/token"),
            format!("{server_uri}/v2"),
        )
    }

    #[test]
    fn authorization_url_carries_state_and_redirect() {
        let client = client("https://zoom.test");
        let url = client.authorization_url("signed-state").unwrap();
        assert!(url.starts_with("https://zoom.test/oauth/authorize?response_type=code"));
        assert!(url.contains("state=signed-state"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fself.test"));
    }

    #[tokio::test]
    async fn exchange_code_uses_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header_exists("authorization"))
            .and(body_string_contains("grant_type=authorization_code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "zat-1",
                "refresh_token": "zrt-1",
                "expires_in": 3600,
                "scope": "meeting:write",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let grant = client(&server.uri()).exchange_code("auth-code").await.unwrap();
        assert_eq!(grant.access_token, "zat-1");
        assert_eq!(grant.refresh_token.as_deref(), Some("zrt-1"));
    }

    #[tokio::test]
    async fn refresh_returns_rotated_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=zrt-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "zat-2",
                "refresh_token": "zrt-2",
                "expires_in": 3600,
            })))
            .mount(&server)
            .await;

        let grant = client(&server.uri()).refresh_access_token("zrt-1").await.unwrap();
        assert_eq!(grant.access_token, "zat-2");
        assert_eq!(grant.refresh_token.as_deref(), Some("zrt-2"));
    }

    #[tokio::test]
    async fn token_error_keeps_raw_provider_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"reason":"Invalid Token!"}"#),
            )
            .mount(&server)
            .await;

        let err = client(&server.uri()).refresh_access_token("stale").await.unwrap_err();
        match err {
            SchedlinkError::Provider(msg) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("Invalid Token!"));
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_identity_reads_users_me() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "z-123",
                "email": "emp@example.com",
            })))
            .mount(&server)
            .await;

        let identity = client(&server.uri()).fetch_identity("zat-1").await.unwrap();
        assert_eq!(identity.email.as_deref(), Some("emp@example.com"));
        assert_eq!(identity.account_id.as_deref(), Some("z-123"));
    }
}
