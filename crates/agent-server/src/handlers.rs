//! HTTP Handlers

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Serialize;

use agent_core::{AgentError, CancellationToken};

use crate::error::ApiError;
use crate::gateway::{ChatReply, ChatRequest, MISSING_FIELDS};
use crate::state::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
}

/// Liveness
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Agent API is running ✅",
    })
}

/// Run one chat turn
pub async fn chat_agent(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected chat body");
        AgentError::InvalidRequest(MISSING_FIELDS.into())
    })?;

    // Dropping the request future (client gone) cancels the turn
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let reply = state.gateway.handle(request, &cancel).await?;
    Ok(Json(reply))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use agent_core::{Decision, ToolCall};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::app::router;
    use crate::state::AppState;
    use crate::test_support::{FlakyStore, ScriptedProvider, gateway};

    fn app(provider: Arc<ScriptedProvider>, store: Arc<FlakyStore>) -> axum::Router {
        router(AppState {
            gateway: Arc::new(gateway(provider, store)),
        })
    }

    async fn post_chat(app: axum::Router, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::post("/chat-agent")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_root() {
        let app = app(Arc::new(ScriptedProvider::new(vec![])), Arc::new(FlakyStore::healthy()));
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"message": "Agent API is running ✅"}));
    }

    #[tokio::test]
    async fn test_missing_fields_touch_nothing() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let store = Arc::new(FlakyStore::healthy());

        for body in ["{}", r#"{"user_id": "u1"}"#, r#"{"message": "hi"}"#, "not json"] {
            let (status, json) = post_chat(app(provider.clone(), store.clone()), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json, json!({"error": "Missing user_id or message"}));
        }

        assert_eq!(provider.calls(), 0);
        assert_eq!(store.loads(), 0);
        assert_eq!(store.appended(), 0);
    }

    #[tokio::test]
    async fn test_reminder_turn() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Decision::ToolCall(ToolCall::new("ReminderTool", "10 minutes")),
            Decision::FinalAnswer("✅ Reminder has been set for: 10 minutes".into()),
        ]));
        let store = Arc::new(FlakyStore::healthy());

        let (status, json) = post_chat(
            app(provider.clone(), store.clone()),
            r#"{"user_id": "u1", "message": "remind me in 10 minutes"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"reply": "✅ Reminder has been set for: 10 minutes"}));
        assert_eq!(provider.calls(), 2);
        assert_eq!(store.appended(), 3);
    }

    #[tokio::test]
    async fn test_persist_failure_flagged() {
        let provider = Arc::new(ScriptedProvider::new(vec![Decision::FinalAnswer("hi".into())]));
        let (status, json) = post_chat(
            app(provider, Arc::new(FlakyStore::failing_appends())),
            r#"{"user_id": "u1", "message": "hello"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"reply": "hi", "persisted": false}));
    }

    #[tokio::test]
    async fn test_provider_failure_is_error_only() {
        let provider = Arc::new(ScriptedProvider::unavailable());
        let (status, json) = post_chat(
            app(provider, Arc::new(FlakyStore::healthy())),
            r#"{"user_id": "u1", "message": "hello"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object["error"].is_string());
    }
}
