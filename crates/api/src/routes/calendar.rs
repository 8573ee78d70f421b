//! Google Calendar proxy routes
//!
//! Thin I/O over the token refresher: every request resolves the
//! employee's Google access token first, then proxies the calendar call.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::DateTime;
use serde::Deserialize;
use serde_json::{json, Value};

use schedlink_domain::SchedlinkError;

use crate::context::AppContext;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct FreeBusyParams {
    #[serde(rename = "timeMin")]
    pub time_min: Option<String>,
    #[serde(rename = "timeMax")]
    pub time_max: Option<String>,
    pub employee_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub employee_id: Option<String>,
    pub start_iso: Option<String>,
    pub end_iso: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub attendee_email: Option<String>,
}

/// `GET /api/freebusy`
pub async fn freebusy(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<FreeBusyParams>,
) -> Result<Json<Value>, ApiError> {
    let time_min = required(params.time_min.as_deref(), "timeMin")?;
    let time_max = required(params.time_max.as_deref(), "timeMax")?;
    let employee_id = required(params.employee_id.as_deref(), "employee_id")?;

    let token = ctx
        .refresher
        .get_access_token(ctx.google.as_ref(), employee_id)
        .await?;

    let response = ctx
        .http
        .post(format!("{}/freeBusy", ctx.config.endpoints.google_calendar_base_url))
        .bearer_auth(&token)
        .json(&json!({
            "timeMin": time_min,
            "timeMax": time_max,
            "items": [{ "id": "primary" }],
        }))
        .send()
        .await
        .map_err(|e| SchedlinkError::Network(format!("freebusy request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
        return Err(SchedlinkError::Provider(format!(
            "google freebusy returned {status}: {body}"
        ))
        .into());
    }

    let payload: Value = response.json().await.map_err(|e| {
        SchedlinkError::Provider(format!("unreadable freebusy response: {e}"))
    })?;
    let busy = payload
        .pointer("/calendars/primary/busy")
        .cloned()
        .unwrap_or_else(|| json!([]));

    Ok(Json(json!({ "busy": busy })))
}

/// `POST /api/calendar-create`
pub async fn create_event(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<CreateEventRequest>,
) -> Result<Json<Value>, ApiError> {
    let employee_id = required(request.employee_id.as_deref(), "employee_id")?;
    let start_iso = rfc3339(request.start_iso.as_deref(), "start_iso")?;
    let end_iso = rfc3339(request.end_iso.as_deref(), "end_iso")?;

    let token = ctx
        .refresher
        .get_access_token(ctx.google.as_ref(), employee_id)
        .await?;

    let mut event = json!({
        "summary": request.summary.as_deref().unwrap_or("Meeting"),
        "start": { "dateTime": start_iso },
        "end": { "dateTime": end_iso },
    });
    if let Some(description) = &request.description {
        event["description"] = json!(description);
    }
    if let Some(attendee) = &request.attendee_email {
        event["attendees"] = json!([{ "email": attendee }]);
    }

    let response = ctx
        .http
        .post(format!(
            "{}/calendars/primary/events",
            ctx.config.endpoints.google_calendar_base_url
        ))
        .bearer_auth(&token)
        .json(&event)
        .send()
        .await
        .map_err(|e| SchedlinkError::Network(format!("event creation failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
        return Err(SchedlinkError::Provider(format!(
            "google event creation returned {status}: {body}"
        ))
        .into());
    }

    let created: Value = response.json().await.map_err(|e| {
        SchedlinkError::Provider(format!("unreadable event response: {e}"))
    })?;

    Ok(Json(json!({
        "id": created.get("id"),
        "htmlLink": created.get("htmlLink"),
        "status": created.get("status"),
    })))
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SchedlinkError::InvalidInput(format!("{name} is required")).into()),
    }
}

fn rfc3339<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ApiError> {
    let raw = required(value, name)?;
    DateTime::parse_from_rfc3339(raw).map_err(|_| {
        ApiError(SchedlinkError::InvalidInput(format!(
            "{name} must be an RFC 3339 timestamp"
        )))
    })?;
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_accepts_offsets_and_rejects_garbage() {
        assert!(rfc3339(Some("2026-09-01T10:00:00+09:00"), "start_iso").is_ok());
        assert!(rfc3339(Some("2026-09-01T01:00:00Z"), "start_iso").is_ok());
        assert!(rfc3339(Some("next tuesday"), "start_iso").is_err());
        assert!(rfc3339(None, "start_iso").is_err());
    }

    #[test]
    fn required_rejects_blank_values() {
        assert!(required(Some("  "), "employee_id").is_err());
        assert_eq!(required(Some("emp-1"), "employee_id").unwrap(), "emp-1");
    }
}
