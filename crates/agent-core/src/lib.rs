//! # agent-core
//!
//! Core of the conversational agent gateway: provider-agnostic completion
//! abstraction, tool registry, conversation storage capability and the bounded
//! agent loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                             Agent                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌────────────────────────┐    │
//! │  │  Reasoning  │  │    Tools    │  │  CompletionProvider    │    │
//! │  │    Loop     │──│   Registry  │──│  (Strategy)            │    │
//! │  └─────────────┘  └─────────────┘  └────────────────────────┘    │
//! └──────────────────────────────────────────────────────────────────┘
//!          ▲
//!          │ history in, new messages out
//! ┌────────┴──────────┐
//! │ ConversationStore │
//! └───────────────────┘
//! ```
//!
//! The `CompletionProvider` and `ConversationStore` traits keep the loop
//! independent of any particular LLM vendor or database schema.

pub mod error;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod store;
pub mod tool;

pub use error::{AgentError, BoxError, Result};
pub use message::{ConversationId, Message, Role, ToolInvocation};
pub use provider::{CompletionProvider, Decision, GenerationOptions};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, TurnResult};
pub use store::{ConversationStore, MemoryConversationStore};
pub use tool::{ReminderTool, Tool, ToolCall, ToolDescriptor, ToolRegistry};
pub use tokio_util::sync::CancellationToken;
