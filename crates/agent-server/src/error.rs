//! HTTP error mapping

use agent_core::AgentError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Turn failure on its way out as a JSON response
#[derive(Debug)]
pub struct ApiError(pub AgentError);

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self.0 {
            AgentError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AgentError::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AgentError::ProviderTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AgentError::MalformedDecision { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.0, "Chat request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.user_message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AgentError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (AgentError::ProviderUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AgentError::ProviderTimeout(Duration::from_secs(1)), StatusCode::GATEWAY_TIMEOUT),
            (AgentError::malformed("bad", "{}"), StatusCode::BAD_GATEWAY),
            (AgentError::ToolLoopExceeded(5), StatusCode::INTERNAL_SERVER_ERROR),
            (AgentError::Cancelled, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn test_provider_detail_not_leaked() {
        let err = ApiError(AgentError::ProviderUnavailable("API error 401: sk-secret".into()));
        assert!(!err.0.user_message().contains("sk-secret"));
    }
}
