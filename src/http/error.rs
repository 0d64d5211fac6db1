//! Error responses for the HTTP API

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use crate::data::SourceError;

/// Errors surfaced to HTTP clients
#[derive(Debug, Error)]
pub enum ApiError {
    /// The route has no payload to serve and the refresh failed
    #[error("{route} data unavailable: {error}")]
    Unavailable {
        route: &'static str,
        #[source]
        error: SourceError,
    },

    /// Pre-launch gate is active and the request has no access cookie
    #[error("site locked")]
    Locked,

    /// Unlock attempt with the wrong password
    #[error("incorrect password")]
    WrongPassword,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Locked | ApiError::WrongPassword => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::Unavailable { route, error } => json!({
                "error": error.to_string(),
                "source": route,
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let unavailable = ApiError::Unavailable {
            route: "earthquakes",
            error: SourceError::Status(502),
        };
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ApiError::Locked.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::WrongPassword.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_unavailable_message_names_route() {
        let err = ApiError::Unavailable {
            route: "seismic",
            error: SourceError::Malformed("no features".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("seismic"));
        assert!(message.contains("no features"));
    }

    #[test]
    fn test_into_response_sets_status() {
        let response = ApiError::Locked.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
