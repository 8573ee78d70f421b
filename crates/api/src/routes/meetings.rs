//! Zoom meeting creation route

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use schedlink_domain::SchedlinkError;

use crate::context::AppContext;
use crate::error::ApiError;

const DEFAULT_TOPIC: &str = "Meeting";
const DEFAULT_DURATION_MINUTES: i64 = 30;
const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";

#[derive(Debug, Deserialize)]
pub struct CreateMeetingRequest {
    pub employee_id: Option<String>,
    pub topic: Option<String>,
    pub start_time: Option<String>,
    pub duration: Option<i64>,
    pub timezone: Option<String>,
    pub agenda: Option<String>,
}

/// `POST /api/zoom-meeting`
pub async fn create_meeting(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<CreateMeetingRequest>,
) -> Result<Json<Value>, ApiError> {
    let employee_id = match request.employee_id.as_deref() {
        Some(v) if !v.trim().is_empty() => v,
        _ => return Err(SchedlinkError::InvalidInput("employee_id is required".into()).into()),
    };
    let start_time = match request.start_time.as_deref() {
        Some(v) if !v.trim().is_empty() => v,
        _ => return Err(SchedlinkError::InvalidInput("start_time is required".into()).into()),
    };

    let token = ctx
        .refresher
        .get_access_token(ctx.zoom.as_ref(), employee_id)
        .await?;

    // type 2 = scheduled meeting
    let body = json!({
        "topic": request.topic.as_deref().unwrap_or(DEFAULT_TOPIC),
        "type": 2,
        "start_time": start_time,
        "duration": request.duration.unwrap_or(DEFAULT_DURATION_MINUTES),
        "timezone": request.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE),
        "agenda": request.agenda.as_deref().unwrap_or(""),
        "settings": {
            "join_before_host": true,
            "waiting_room": false,
        },
    });

    let response = ctx
        .http
        .post(format!("{}/users/me/meetings", ctx.config.endpoints.zoom_api_base_url))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .map_err(|e| SchedlinkError::Network(format!("zoom meeting request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
        return Err(SchedlinkError::Provider(format!(
            "zoom meeting creation returned {status}: {body}"
        ))
        .into());
    }

    let meeting: Value = response.json().await.map_err(|e| {
        SchedlinkError::Provider(format!("unreadable zoom meeting response: {e}"))
    })?;

    Ok(Json(json!({
        "id": meeting.get("id"),
        "join_url": meeting.get("join_url"),
        "start_url": meeting.get("start_url"),
        "password": meeting.get("password"),
    })))
}
