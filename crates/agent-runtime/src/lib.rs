//! # agent-runtime
//!
//! Concrete adapters for the agent core.
//!
//! ## Providers
//!
//! - **OpenAI**: chat-completions API with native function calling
//!
//! ## Stores
//!
//! - **Supabase**: PostgREST `ai_messages` table
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{OpenAiConfig, OpenAiProvider};
//!
//! let provider = OpenAiProvider::new(OpenAiConfig::new(api_key))?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .tools(Arc::new(tools))
//!     .build()?;
//! ```

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "supabase")]
pub mod supabase;

#[cfg(test)]
mod test_support;

#[cfg(feature = "openai")]
pub use openai::{OpenAiConfig, OpenAiProvider};

#[cfg(feature = "supabase")]
pub use supabase::{SupabaseConfig, SupabaseStore};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, CompletionProvider, ConversationStore, Message, Result, Role, Tool,
    ToolRegistry,
};
