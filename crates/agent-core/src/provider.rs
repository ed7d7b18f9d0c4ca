//! Completion Provider Strategy Pattern
//!
//! Defines a common interface for all LLM backends. A provider turns the
//! conversation so far plus the available tools into a single [`Decision`]:
//! either answer, or ask for one tool call.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{CompletionProvider, Decision};
//!
//! let provider = OpenAiProvider::new(config)?;
//!
//! match provider.complete(&history, &registry.describe_all()).await? {
//!     Decision::FinalAnswer(text) => println!("{text}"),
//!     Decision::ToolCall(call) => registry.invoke(&call.name, &call.input).await?,
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;
use crate::tool::{ToolCall, ToolDescriptor};

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "gpt-4", "gpt-4o-mini")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// System prompt sent ahead of the history
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

const fn default_temperature() -> f32 {
    0.5
}

const fn default_max_tokens() -> u32 {
    1024
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant for content creators.

Use the available tools when the user asks for something a tool can do, \
then confirm the tool's result to the user in your reply.
If you can answer directly without tools, do so.
Be concise and accurate.";

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4".into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// One reasoning step's outcome
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Reply to the user; ends the turn
    FinalAnswer(String),

    /// Run a tool, then ask again
    ToolCall(ToolCall),
}

/// Strategy trait for completion providers
///
/// Implementations translate their native response shape into a
/// [`Decision`]. They must fail with `MalformedDecision` rather than guess when
/// the response cannot be translated, `ProviderUnavailable` on transport or
/// auth failures, and `ProviderTimeout` when their own deadline expires.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Produce the next decision. `history` is read-only.
    async fn complete(&self, history: &[Message], tools: &[ToolDescriptor]) -> Result<Decision>;
}
