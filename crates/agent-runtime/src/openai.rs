//! OpenAI Completion Provider
//!
//! Implementation of `CompletionProvider` over the chat-completions API with
//! native function calling. Every registered tool is exposed as a function
//! taking a single string parameter `input`.

use std::time::Duration;

use agent_core::{
    AgentError, CompletionProvider, Decision, GenerationOptions, Message, Result, Role,
    ToolCall, ToolDescriptor,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI provider configuration
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token
    pub api_key: String,

    /// API base URL, without trailing slash
    pub base_url: String,

    /// Model, temperature, token limit and system prompt
    pub generation: GenerationOptions,

    /// HTTP request timeout
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            generation: GenerationOptions::default(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// OpenAI chat-completions provider
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    /// Create from configuration
    pub fn new(mut config: OpenAiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AgentError::Config("OpenAI API key is empty".into()));
        }
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.generation.model
    }

    fn build_request<'a>(
        &'a self,
        history: &[Message],
        tools: &[ToolDescriptor],
    ) -> ChatRequest<'a> {
        let generation = &self.config.generation;
        ChatRequest {
            model: &generation.model,
            messages: convert_messages(&generation.system_prompt, history),
            tools: tools.iter().map(WireTool::from_descriptor).collect(),
            temperature: generation.temperature,
            max_tokens: generation.max_tokens,
        }
    }

    fn transport_error(&self, err: &reqwest::Error) -> AgentError {
        if err.is_timeout() {
            AgentError::ProviderTimeout(self.config.timeout)
        } else {
            AgentError::ProviderUnavailable(format!("Request failed: {err}"))
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn complete(&self, history: &[Message], tools: &[ToolDescriptor]) -> Result<Decision> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let request = self.build_request(history, tools);

        tracing::debug!(
            model = %self.model(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Calling completion API"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let raw = response.text().await.map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            tracing::warn!(%status, body = %preview(&raw), "Completion API error");
            return Err(AgentError::ProviderUnavailable(format!(
                "API error {status}: {}",
                preview(&raw)
            )));
        }

        parse_decision(&raw)
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, PartialEq, Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl WireMessage {
    fn text(role: &'static str, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunctionCall,
}

fn function_type() -> String {
    "function".into()
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction,
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: Value,
}

impl WireTool {
    fn from_descriptor(descriptor: &ToolDescriptor) -> Self {
        Self {
            kind: "function",
            function: WireFunction {
                name: descriptor.name.clone(),
                description: descriptor.description.clone(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "input": {"type": "string", "description": "Tool input"}
                    },
                    "required": ["input"]
                }),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

/// Convert agent history to chat-completions messages.
///
/// Tool messages recorded in-process replay as an assistant `tool_calls` entry
/// followed by the matching `tool` reply. Tool messages without a call ID
/// (e.g. loaded from storage) are passed as user-role context.
fn convert_messages(system_prompt: &str, history: &[Message]) -> Vec<WireMessage> {
    let mut out = Vec::with_capacity(history.len() + 1);
    out.push(WireMessage::text("system", system_prompt));

    for message in history {
        match (message.role, message.tool.as_ref()) {
            (Role::User, _) => out.push(WireMessage::text("user", &message.content)),
            (Role::Assistant, _) => out.push(WireMessage::text("assistant", &message.content)),
            (Role::Tool, Some(record)) => match &record.call_id {
                Some(id) => {
                    out.push(WireMessage {
                        role: "assistant",
                        content: None,
                        tool_calls: Some(vec![WireToolCall {
                            id: id.clone(),
                            kind: function_type(),
                            function: WireFunctionCall {
                                name: record.tool_name.clone(),
                                arguments: json!({ "input": record.input }).to_string(),
                            },
                        }]),
                        tool_call_id: None,
                    });
                    out.push(WireMessage {
                        role: "tool",
                        content: Some(message.content.clone()),
                        tool_calls: None,
                        tool_call_id: Some(id.clone()),
                    });
                }
                None => {
                    let verb = if record.failed { "failed" } else { "returned" };
                    out.push(WireMessage::text(
                        "user",
                        format!("[Tool '{}' {verb}]\n{}", record.tool_name, message.content),
                    ));
                }
            },
            (Role::Tool, None) => {
                out.push(WireMessage::text("user", format!("[Tool result]\n{}", message.content)));
            }
        }
    }

    out
}

/// Translate a raw chat-completions body into a decision
fn parse_decision(raw: &str) -> Result<Decision> {
    let response: ChatResponse = serde_json::from_str(raw)
        .map_err(|e| AgentError::malformed(format!("unparseable response body: {e}"), raw))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AgentError::malformed("no choices in response", raw))?;

    let mut tool_calls = choice.message.tool_calls.unwrap_or_default().into_iter();
    if let Some(call) = tool_calls.next() {
        let ignored = tool_calls.len();
        if ignored > 0 {
            tracing::warn!(ignored, "Provider requested several tool calls; using the first");
        }

        let name = call.function.name.trim();
        if name.is_empty() {
            return Err(AgentError::malformed("tool call without a name", raw));
        }
        let input = extract_input(&call.function.arguments).ok_or_else(|| {
            AgentError::malformed(
                format!("tool call arguments not understood: {}", call.function.arguments),
                raw,
            )
        })?;

        return Ok(Decision::ToolCall(ToolCall::new(name, input).with_id(call.id)));
    }

    match choice.message.content {
        Some(content) if !content.trim().is_empty() => Ok(Decision::FinalAnswer(content)),
        _ => Err(AgentError::malformed("neither content nor tool call", raw)),
    }
}

/// Pull the tool input out of a function-call arguments string
fn extract_input(arguments: &str) -> Option<String> {
    match serde_json::from_str::<Value>(arguments).ok()? {
        Value::String(s) => Some(s),
        Value::Object(map) => match map.get("input") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => None,
            None if map.len() == 1 => map.into_iter().next().and_then(|(_, v)| match v {
                Value::String(s) => Some(s),
                _ => None,
            }),
            None => None,
        },
        _ => None,
    }
}

/// Leading slice of a response body for logs, cut on a char boundary
fn preview(s: &str) -> &str {
    const MAX_BYTES: usize = 500;
    if s.len() <= MAX_BYTES {
        return s;
    }
    let mut end = MAX_BYTES;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
