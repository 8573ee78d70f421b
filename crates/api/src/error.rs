//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use schedlink_domain::SchedlinkError;

/// Wrapper turning domain errors into JSON error responses
#[derive(Debug)]
pub struct ApiError(pub SchedlinkError);

impl From<SchedlinkError> for ApiError {
    fn from(value: SchedlinkError) -> Self {
        ApiError(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SchedlinkError::InvalidInput(_) | SchedlinkError::InvalidState(_) => {
                StatusCode::BAD_REQUEST
            }
            SchedlinkError::NotConnected(_) => StatusCode::CONFLICT,
            SchedlinkError::Provider(_) => StatusCode::BAD_GATEWAY,
            SchedlinkError::Config(_)
            | SchedlinkError::Database(_)
            | SchedlinkError::Network(_)
            | SchedlinkError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_maps_to_bad_request() {
        let response = ApiError(SchedlinkError::InvalidState("nope".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_connected_maps_to_conflict() {
        let response = ApiError(SchedlinkError::NotConnected("emp/zoom".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn provider_failure_maps_to_bad_gateway() {
        let response = ApiError(SchedlinkError::Provider("500 from google".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
