//! Application context and router wiring

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use schedlink_core::ports::{CredentialStore, HostNotifier, OAuthProviderClient};
use schedlink_core::{ConnectService, TokenRefresher};
use schedlink_domain::{Config, Provider, Result};
use schedlink_infra::{
    build_http_client, DbManager, GoogleOAuthClient, SqliteCredentialStore, WebhookHostNotifier,
    ZoomOAuthClient,
};

use crate::routes;

/// Shared application state owned by the router
pub struct AppContext {
    pub config: Config,
    pub http: reqwest::Client,
    pub store: Arc<dyn CredentialStore>,
    pub connect: Arc<ConnectService>,
    pub refresher: Arc<TokenRefresher>,
    pub google: Arc<GoogleOAuthClient>,
    pub zoom: Arc<ZoomOAuthClient>,
}

impl AppContext {
    /// Wire up the full application from a resolved configuration.
    ///
    /// Opens the database, runs migrations, and constructs the provider
    /// clients and services.
    pub fn new(config: Config) -> Result<Self> {
        let http = build_http_client()?;

        let db = DbManager::new(&config.database.path, config.database.pool_size)?;
        db.run_migrations()?;
        let store: Arc<dyn CredentialStore> =
            Arc::new(SqliteCredentialStore::new(db.pool().clone()));

        let notifier: Option<Arc<dyn HostNotifier>> = config
            .host_notify
            .clone()
            .map(|cfg| Arc::new(WebhookHostNotifier::new(http.clone(), cfg)) as Arc<dyn HostNotifier>);

        let connect = Arc::new(ConnectService::new(
            store.clone(),
            notifier,
            config.state_secret.clone(),
            config.fixed_return_url.clone(),
        ));
        let refresher = Arc::new(TokenRefresher::new(store.clone()));

        let endpoints = &config.endpoints;
        let google = Arc::new(GoogleOAuthClient::new(
            http.clone(),
            config.google.clone(),
            endpoints.google_auth_url.clone(),
            endpoints.google_token_url.clone(),
            endpoints.google_userinfo_url.clone(),
        ));
        let zoom = Arc::new(ZoomOAuthClient::new(
            http.clone(),
            config.zoom.clone(),
            endpoints.zoom_auth_url.clone(),
            endpoints.zoom_token_url.clone(),
            endpoints.zoom_api_base_url.clone(),
        ));

        info!(db_path = %config.database.path, "application context initialised");

        Ok(Self { config, http, store, connect, refresher, google, zoom })
    }

    /// Provider client for a parsed provider value
    pub fn client_for(&self, provider: Provider) -> &dyn OAuthProviderClient {
        match provider {
            Provider::Google => self.google.as_ref(),
            Provider::Zoom => self.zoom.as_ref(),
        }
    }
}

/// Build the HTTP router over a shared context
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/auth/{provider}/start", get(routes::auth::start))
        .route("/api/auth/{provider}/callback", get(routes::auth::callback))
        .route("/api/freebusy", get(routes::calendar::freebusy))
        .route("/api/calendar-create", post(routes::calendar::create_event))
        .route("/api/zoom-meeting", post(routes::meetings::create_meeting))
        .with_state(ctx)
}
