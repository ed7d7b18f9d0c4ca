//! Error Types

use std::time::Duration;

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Boxed error cause carried by adapter and tool failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// Client input malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Provider unreachable, rejected credentials, or returned a failure status
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider did not answer within the configured deadline
    #[error("Provider timed out after {0:?}")]
    ProviderTimeout(Duration),

    /// Provider response could not be turned into a decision
    #[error("Malformed provider decision: {reason}")]
    MalformedDecision { reason: String, raw: String },

    /// Conversation store failure
    #[error("Store error ({context}): {source}")]
    Store {
        context: String,
        #[source]
        source: BoxError,
    },

    /// Tool not found in registry
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool ran and failed
    #[error("Tool '{tool}' failed: {source}")]
    ToolExecution {
        tool: String,
        #[source]
        source: BoxError,
    },

    /// Tool name registered twice
    #[error("Duplicate tool: {0}")]
    DuplicateTool(String),

    /// Turn needed more tool calls than allowed
    #[error("Tool call limit ({0}) exceeded")]
    ToolLoopExceeded(usize),

    /// Turn was cancelled by its caller
    #[error("Turn cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AgentError {
    /// Build a store error from any cause
    pub fn store(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Store {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Build a malformed-decision error, keeping the raw payload for diagnosis
    pub fn malformed(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::MalformedDecision {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// Transient provider failures are the only retryable errors
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::ProviderTimeout(_)
        )
    }

    /// Tool failures the agent loop feeds back to the provider instead of aborting
    pub const fn is_recoverable_tool_failure(&self) -> bool {
        matches!(self, Self::UnknownTool(_) | Self::ToolExecution { .. })
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidRequest(msg) => msg.clone(),
            Self::ProviderUnavailable(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            Self::ProviderTimeout(_) => {
                "The AI service took too long to respond. Please try again.".into()
            }
            Self::MalformedDecision { .. } => {
                "The AI service returned an unexpected response.".into()
            }
            Self::ToolLoopExceeded(_) => {
                "The request needed too many steps to complete. Please try a simpler request."
                    .into()
            }
            Self::Cancelled => "The request was cancelled.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
