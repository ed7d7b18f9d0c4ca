//! Tool System
//!
//! Named capabilities the agent can invoke. Tools are registered once at
//! startup; afterwards the registry is only read, so it is shared behind an
//! `Arc` across concurrent turns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};

/// Tool call request from the provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier
    pub name: String,

    /// Free-text input
    pub input: String,

    /// Optional call ID for tracking
    #[serde(default)]
    pub id: Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            id: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Name and description shown to the provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name and description for prompting
    fn descriptor(&self) -> ToolDescriptor;

    /// Run the tool. Errors are reported to the agent as tool failures.
    async fn invoke(&self, input: &str) -> anyhow::Result<String>;
}

/// Registry for available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<(ToolDescriptor, Arc<dyn Tool>)>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let descriptor = tool.descriptor();
        if self.index.contains_key(&descriptor.name) {
            return Err(AgentError::DuplicateTool(descriptor.name));
        }
        self.index.insert(descriptor.name.clone(), self.tools.len());
        self.tools.push((descriptor, tool));
        Ok(())
    }

    /// Descriptors in registration order
    pub fn describe_all(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|(d, _)| d.clone()).collect()
    }

    /// Invoke a tool by name
    pub async fn invoke(&self, name: &str, input: &str) -> Result<String> {
        let (_, tool) = self
            .index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))?;

        tool.invoke(input)
            .await
            .map_err(|e| AgentError::ToolExecution {
                tool: name.to_string(),
                source: e.into(),
            })
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|(d, _)| d.name.as_str()).collect()
    }
}

// ============================================================================
// Built-in Tools
// ============================================================================

/// Reminder tool - acknowledges a reminder request
///
/// Placeholder: it does not schedule anything yet, it only confirms the time
/// description back to the model.
pub struct ReminderTool;

impl ReminderTool {
    pub const NAME: &'static str = "ReminderTool";
}

#[async_trait]
impl Tool for ReminderTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: Self::NAME.into(),
            description: "Use this tool to set a reminder for content creation. \
                          Input should be a time or time description."
                .into(),
        }
    }

    async fn invoke(&self, input: &str) -> anyhow::Result<String> {
        let time = input.trim();
        anyhow::ensure!(!time.is_empty(), "reminder time is empty");
        tracing::info!(time, "Reminder requested");
        Ok(format!("✅ Reminder has been set for: {time}"))
    }
}
