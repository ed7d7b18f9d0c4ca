//! Chat Gateway
//!
//! One request, one turn: validate, load history (degrading to empty), run the
//! agent, persist what the turn produced (best-effort), reply.

use std::sync::Arc;
use std::time::Duration;

use agent_core::{
    Agent, AgentError, CancellationToken, ConversationId, ConversationStore, Message, Result,
    ToolInvocation,
};
use serde::{Deserialize, Serialize};

pub const MISSING_FIELDS: &str = "Missing user_id or message";

/// Inbound chat request
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    /// Both fields present and non-blank
    pub fn validate(self) -> Result<(ConversationId, String)> {
        let present = |field: Option<String>| field.filter(|s| !s.trim().is_empty());
        match (present(self.user_id), present(self.message)) {
            (Some(user_id), Some(message)) => Ok((ConversationId::new(user_id.trim()), message)),
            _ => Err(AgentError::InvalidRequest(MISSING_FIELDS.into())),
        }
    }
}

/// Successful turn as seen by the HTTP layer
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,

    /// Present (and `false`) only when the turn could not be fully persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persisted: Option<bool>,

    #[serde(skip)]
    pub tool_invocations: Vec<ToolInvocation>,
}

/// Gateway settings
#[derive(Clone, Debug)]
pub struct GatewaySettings {
    pub history_limit: usize,
    pub store_timeout: Duration,
}

pub struct Gateway {
    agent: Arc<Agent>,
    store: Arc<dyn ConversationStore>,
    settings: GatewaySettings,
}

impl Gateway {
    pub fn new(
        agent: Arc<Agent>,
        store: Arc<dyn ConversationStore>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            agent,
            store,
            settings,
        }
    }

    /// Run one chat turn
    pub async fn handle(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ChatReply> {
        let (conversation, text) = request.validate()?;
        let user_message = Message::user(text);

        let history = self.load_history(&conversation).await;

        match self.agent.run_turn(&history, &user_message, cancel).await {
            Ok(turn) => {
                let produced: Vec<&Message> =
                    std::iter::once(&user_message).chain(&turn.messages).collect();
                let persisted = self.persist(&conversation, &produced).await;
                tracing::info!(
                    conversation = %conversation,
                    tool_calls = turn.tool_invocations.len(),
                    persisted,
                    "Turn complete"
                );
                Ok(ChatReply {
                    reply: turn.reply,
                    persisted: (!persisted).then_some(false),
                    tool_invocations: turn.tool_invocations,
                })
            }
            Err(AgentError::Cancelled) => {
                tracing::info!(conversation = %conversation, "Turn cancelled");
                Err(AgentError::Cancelled)
            }
            Err(e) => {
                tracing::error!(conversation = %conversation, error = %e, "Turn failed");
                self.persist(&conversation, &[&user_message]).await;
                Err(e)
            }
        }
    }

    /// Load history; store failures and timeouts degrade to an empty history
    async fn load_history(&self, conversation: &ConversationId) -> Vec<Message> {
        let load = self.store.load(conversation, self.settings.history_limit);
        match tokio::time::timeout(self.settings.store_timeout, load).await {
            Ok(Ok(history)) => history,
            Ok(Err(e)) => {
                tracing::warn!(
                    conversation = %conversation,
                    error = %e,
                    "History unavailable, continuing without it"
                );
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    conversation = %conversation,
                    timeout = ?self.settings.store_timeout,
                    "History load timed out, continuing without it"
                );
                Vec::new()
            }
        }
    }

    /// Append messages in order, stopping at the first failure.
    /// Returns whether everything was stored.
    async fn persist(&self, conversation: &ConversationId, messages: &[&Message]) -> bool {
        for message in messages {
            if let Err(e) = self.store.append(conversation, message).await {
                tracing::warn!(
                    conversation = %conversation,
                    role = %message.role,
                    error = %e,
                    "Failed to persist message"
                );
                return false;
            }
        }
        true
    }
}
