//! Test doubles shared by the gateway and handler tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use agent_core::{
    AgentBuilder, AgentError, CompletionProvider, ConversationId, ConversationStore, Decision,
    Message, ReminderTool, Result, ToolDescriptor, ToolRegistry,
};
use async_trait::async_trait;

use crate::gateway::{Gateway, GatewaySettings};

/// Replays decisions in order and records the history length of each call
pub struct ScriptedProvider {
    decisions: Mutex<VecDeque<Decision>>,
    unavailable: bool,
    histories: Mutex<Vec<usize>>,
}

impl ScriptedProvider {
    pub fn new(decisions: Vec<Decision>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into()),
            unavailable: false,
            histories: Mutex::new(Vec::new()),
        }
    }

    /// Always fails with `ProviderUnavailable`
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn history_lengths(&self) -> Vec<usize> {
        self.histories.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.histories.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, history: &[Message], _tools: &[ToolDescriptor]) -> Result<Decision> {
        self.histories.lock().unwrap().push(history.len());
        if self.unavailable {
            return Err(AgentError::ProviderUnavailable("connection refused".into()));
        }
        self.decisions
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AgentError::malformed("script exhausted", ""))
    }
}

/// Store that can be told to fail or stall; counts calls
#[derive(Default)]
pub struct FlakyStore {
    fail_loads: bool,
    stall_loads: bool,
    fail_appends: bool,
    loads: AtomicUsize,
    appends: AtomicUsize,
}

impl FlakyStore {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn failing_loads() -> Self {
        Self {
            fail_loads: true,
            ..Self::default()
        }
    }

    /// Loads that outlast any reasonable store timeout
    pub fn stalling_loads() -> Self {
        Self {
            stall_loads: true,
            ..Self::default()
        }
    }

    pub fn failing_appends() -> Self {
        Self {
            fail_appends: true,
            ..Self::default()
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Successful appends
    pub fn appended(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConversationStore for FlakyStore {
    async fn load(&self, _id: &ConversationId, _limit: usize) -> Result<Vec<Message>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.stall_loads {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        if self.fail_loads {
            return Err(AgentError::store("load", "connection reset"));
        }
        Ok(Vec::new())
    }

    async fn append(&self, _id: &ConversationId, _message: &Message) -> Result<()> {
        if self.fail_appends {
            return Err(AgentError::store("append", "HTTP 503"));
        }
        self.appends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Gateway with the reminder tool registered
pub fn gateway(
    provider: Arc<dyn CompletionProvider>,
    store: Arc<dyn ConversationStore>,
) -> Gateway {
    let mut tools = ToolRegistry::new();
    tools.register(ReminderTool).unwrap();

    let agent = AgentBuilder::new()
        .provider(provider)
        .tools(Arc::new(tools))
        .build()
        .unwrap();

    Gateway::new(
        Arc::new(agent),
        store,
        GatewaySettings {
            history_limit: 10,
            store_timeout: Duration::from_millis(500),
        },
    )
}
