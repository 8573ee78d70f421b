//! OAuth start and callback routes

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use serde::Deserialize;

use schedlink_domain::Provider;

use crate::context::AppContext;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct StartParams {
    pub employee_id: Option<String>,
    pub return_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// `GET /api/auth/{provider}/start`
pub async fn start(
    State(ctx): State<Arc<AppContext>>,
    Path(provider): Path<String>,
    Query(params): Query<StartParams>,
) -> Result<Redirect, ApiError> {
    let provider: Provider = provider.parse()?;
    let url = ctx.connect.start(
        ctx.client_for(provider),
        params.employee_id.as_deref().unwrap_or(""),
        params.return_to.as_deref(),
    )?;
    Ok(Redirect::temporary(&url))
}

/// `GET /api/auth/{provider}/callback`
pub async fn callback(
    State(ctx): State<Arc<AppContext>>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, ApiError> {
    let provider: Provider = provider.parse()?;
    let outcome = ctx
        .connect
        .callback(
            ctx.client_for(provider),
            params.code.as_deref(),
            params.state.as_deref(),
            &ctx.config.app_base_url,
        )
        .await?;
    Ok(Redirect::temporary(&outcome.redirect_url))
}
