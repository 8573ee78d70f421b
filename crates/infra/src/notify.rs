//! Post-commit notification towards the host application
//!
//! After tokens are persisted the host app can be told about the new
//! connection so it can update its own records. The callback flow treats
//! this as fire-and-forget: a notifier failure is logged and never rolls
//! back or fails the connect.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use schedlink_core::ports::HostNotifier;
use schedlink_domain::{HostNotifyConfig, IntegrationRecord, Result, SchedlinkError};

use crate::errors::InfraError;

const API_KEY_HEADER: &str = "x-scheduler-api-key";

/// Webhook implementation of [`HostNotifier`]
pub struct WebhookHostNotifier {
    http: Client,
    config: HostNotifyConfig,
}

impl WebhookHostNotifier {
    pub fn new(http: Client, config: HostNotifyConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl HostNotifier for WebhookHostNotifier {
    async fn token_saved(&self, record: &IntegrationRecord) -> Result<()> {
        let mut request = self.http.post(&self.config.save_token_url).json(&json!({
            "employee_id": record.employee_id,
            "provider": record.provider,
            "provider_account_email": record.provider_account_email,
            "expires_at": record.expires_at,
            "updated_at": record.updated_at,
        }));
        if let Some(api_key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }

        let response = request.send().await.map_err(InfraError::from)?;
        if !response.status().is_success() {
            return Err(SchedlinkError::Network(format!(
                "host save-token endpoint returned {}",
                response.status()
            )));
        }

        debug!(employee_id = %record.employee_id, "host app notified");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use schedlink_domain::Provider;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn record() -> IntegrationRecord {
        let now = Utc::now().timestamp();
        IntegrationRecord {
            employee_id: "emp-1".to_string(),
            provider: Provider::Google,
            access_token: Some("at".to_string()),
            refresh_token: Some("rt".to_string()),
            expires_at: Some(now + 3600),
            provider_account_email: Some("emp@example.com".to_string()),
            provider_account_id: None,
            scopes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn posts_summary_with_api_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hooks/token-saved"))
            .and(header(API_KEY_HEADER, "hook-key"))
            .and(body_string_contains("emp-1"))
            .and(body_string_contains("google"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookHostNotifier::new(
            Client::new(),
            HostNotifyConfig {
                save_token_url: format!("{}/hooks/token-saved", server.uri()),
                api_key: Some("hook-key".to_string()),
            },
        );
        notifier.token_saved(&record()).await.unwrap();
    }

    #[tokio::test]
    async fn payload_never_carries_token_material() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let notifier = WebhookHostNotifier::new(
            Client::new(),
            HostNotifyConfig { save_token_url: server.uri(), api_key: None },
        );
        notifier.token_saved(&record()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8(requests[0].body.clone()).unwrap();
        assert!(!body.contains("\"at\""));
        assert!(!body.contains("\"rt\""));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let notifier = WebhookHostNotifier::new(
            Client::new(),
            HostNotifyConfig { save_token_url: server.uri(), api_key: None },
        );
        let err = notifier.token_saved(&record()).await.unwrap_err();
        assert!(matches!(err, SchedlinkError::Network(_)));
    }
}
