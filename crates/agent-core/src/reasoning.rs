//! Reasoning Loop
//!
//! Runs one conversational turn:
//!
//! ```text
//! START → REASONING → (TOOL_CALL → REASONING)* → DONE
//! ```
//!
//! Each reasoning step asks the provider for a [`Decision`]. Tool calls are
//! bounded per turn; tool failures are fed back to the provider as tool
//! messages rather than aborting the turn. Transient provider failures get a
//! bounded number of immediate retries.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{AgentError, Result};
use crate::message::{Message, ToolInvocation};
use crate::provider::{CompletionProvider, Decision};
use crate::tool::{ToolCall, ToolDescriptor, ToolRegistry};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Maximum tool calls in a single turn
    pub max_tool_calls_per_turn: usize,

    /// Deadline for each provider call
    pub provider_timeout: Duration,

    /// Immediate retries after a transient provider failure
    pub provider_retries: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_calls_per_turn: 5,
            provider_timeout: Duration::from_secs(60),
            provider_retries: 1,
        }
    }
}

/// Outcome of one turn
#[derive(Clone, Debug)]
pub struct TurnResult {
    /// Final reply text
    pub reply: String,

    /// Tool calls made, in order
    pub tool_invocations: Vec<ToolInvocation>,

    /// Tool and assistant messages produced this turn, in order
    pub messages: Vec<Message>,
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn CompletionProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Run one turn for `user_message` on top of `history`.
    ///
    /// `history` is not modified; the messages this turn produced are returned
    /// in [`TurnResult::messages`] for the caller to persist.
    pub async fn run_turn(
        &self,
        history: &[Message],
        user_message: &Message,
        cancel: &CancellationToken,
    ) -> Result<TurnResult> {
        let descriptors = self.tools.describe_all();

        let mut transcript = Vec::with_capacity(history.len() + 2);
        transcript.extend_from_slice(history);
        transcript.push(user_message.clone());
        let turn_start = transcript.len();

        let mut invocations = Vec::new();

        loop {
            match self.decide(&transcript, &descriptors, cancel).await? {
                Decision::FinalAnswer(reply) => {
                    transcript.push(Message::assistant(reply.clone()));
                    tracing::debug!(tool_calls = invocations.len(), "Turn complete");
                    return Ok(TurnResult {
                        reply,
                        tool_invocations: invocations,
                        messages: transcript.split_off(turn_start),
                    });
                }
                Decision::ToolCall(call) => {
                    if invocations.len() >= self.config.max_tool_calls_per_turn {
                        tracing::warn!(
                            limit = self.config.max_tool_calls_per_turn,
                            tool = %call.name,
                            "Tool call limit reached"
                        );
                        return Err(AgentError::ToolLoopExceeded(
                            self.config.max_tool_calls_per_turn,
                        ));
                    }

                    let invocation = self.execute_tool(call, cancel).await?;
                    transcript.push(Message::tool(invocation.clone()));
                    invocations.push(invocation);
                }
            }
        }
    }

    /// Ask the provider for the next decision, with deadline and retries
    async fn decide(
        &self,
        transcript: &[Message],
        tools: &[ToolDescriptor],
        cancel: &CancellationToken,
    ) -> Result<Decision> {
        let timeout = self.config.provider_timeout;
        let mut attempt = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(AgentError::Cancelled);
            }

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(AgentError::Cancelled),
                r = tokio::time::timeout(timeout, self.provider.complete(transcript, tools)) => {
                    r.unwrap_or(Err(AgentError::ProviderTimeout(timeout)))
                }
            };

            match result {
                Ok(decision) => return Ok(decision),
                Err(e) if e.is_retryable() && attempt < self.config.provider_retries => {
                    attempt += 1;
                    tracing::warn!(
                        provider = self.provider.name(),
                        attempt,
                        error = %e,
                        "Transient provider failure, retrying"
                    );
                }
                Err(e) => {
                    if let AgentError::MalformedDecision { reason, raw } = &e {
                        tracing::error!(
                            provider = self.provider.name(),
                            %reason,
                            %raw,
                            "Provider returned a malformed decision"
                        );
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Execute a tool call, turning recoverable failures into a failed record
    async fn execute_tool(
        &self,
        call: ToolCall,
        cancel: &CancellationToken,
    ) -> Result<ToolInvocation> {
        if cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        tracing::debug!(tool = %call.name, input = %call.input, "Executing tool");

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(AgentError::Cancelled),
            r = self.tools.invoke(&call.name, &call.input) => r,
        };

        let (output, failed) = match outcome {
            Ok(output) => (output, false),
            Err(e) if e.is_recoverable_tool_failure() => {
                tracing::warn!(tool = %call.name, error = %e, "Tool failed");
                (format!("Error: {e}"), true)
            }
            Err(e) => return Err(e),
        };

        Ok(ToolInvocation {
            tool_name: call.name,
            input: call.input,
            output,
            call_id: Some(call.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string())),
            failed,
        })
    }
}

/// Builder for Agent configuration
#[derive(Default)]
pub struct AgentBuilder {
    provider: Option<Arc<dyn CompletionProvider>>,
    tools: Option<Arc<ToolRegistry>>,
    config: AgentConfig,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    #[must_use]
    pub const fn max_tool_calls_per_turn(mut self, max: usize) -> Self {
        self.config.max_tool_calls_per_turn = max;
        self
    }

    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.config.provider_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn provider_retries(mut self, retries: usize) -> Self {
        self.config.provider_retries = retries;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;
        let tools = self.tools.unwrap_or_default();

        Ok(Agent::new(provider, tools, self.config))
    }
}
