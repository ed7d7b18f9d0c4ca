//! Supabase Conversation Store
//!
//! `ConversationStore` over a PostgREST table (Supabase's `/rest/v1`). One row
//! per message:
//!
//! | column       | type        |
//! |--------------|-------------|
//! | `user_id`    | text        |
//! | `role`       | text        |
//! | `content`    | text        |
//! | `created_at` | timestamptz |

use std::time::Duration;

use agent_core::{AgentError, ConversationId, ConversationStore, Message, Result, Role};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supabase store configuration
#[derive(Clone, Debug)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,

    /// Service role key
    pub service_key: String,

    /// Table holding messages
    pub table: String,

    /// HTTP request timeout
    pub timeout: Duration,
}

impl SupabaseConfig {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            service_key: service_key.into(),
            table: "ai_messages".into(),
            timeout: Duration::from_secs(3),
        }
    }
}

/// PostgREST-backed conversation store
pub struct SupabaseStore {
    client: reqwest::Client,
    config: SupabaseConfig,
}

#[derive(Debug, Deserialize)]
struct MessageRow {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct NewMessageRow<'a> {
    user_id: &'a str,
    role: &'a str,
    content: &'a str,
    created_at: DateTime<Utc>,
}

impl SupabaseStore {
    /// Create from configuration
    pub fn new(mut config: SupabaseConfig) -> Result<Self> {
        if config.service_key.trim().is_empty() {
            return Err(AgentError::Config("Supabase service key is empty".into()));
        }
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.config.base_url, self.config.table)
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.table_url())
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
    }

    /// Check the status, reading the body into the error on failure
    async fn check(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AgentError::store(context, format!("HTTP {status}: {body}")))
    }
}

/// Decode rows fetched newest-first into messages oldest-first
fn decode_rows(rows: Vec<MessageRow>) -> Vec<Message> {
    let mut messages: Vec<Message> = rows
        .into_iter()
        .filter_map(|row| {
            let Some(role) = Role::parse(&row.role) else {
                tracing::debug!(role = %row.role, "Skipping stored message with unknown role");
                return None;
            };
            let content = row.content.filter(|c| !c.is_empty())?;
            let message = Message::new(role, content);
            Some(match row.created_at {
                Some(at) => message.at(at),
                None => message,
            })
        })
        .collect();
    messages.reverse();
    messages
}

#[async_trait]
impl ConversationStore for SupabaseStore {
    async fn load(&self, id: &ConversationId, limit: usize) -> Result<Vec<Message>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let response = self
            .request(reqwest::Method::GET)
            .query(&[
                ("select", "role,content,created_at".to_string()),
                ("user_id", format!("eq.{id}")),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AgentError::store("load", e))?;

        let rows: Vec<MessageRow> = Self::check(response, "load")
            .await?
            .json()
            .await
            .map_err(|e| AgentError::store("load", e))?;

        let messages = decode_rows(rows);
        tracing::debug!(conversation = %id, loaded = messages.len(), "Loaded history");
        Ok(messages)
    }

    async fn append(&self, id: &ConversationId, message: &Message) -> Result<()> {
        let row = NewMessageRow {
            user_id: id.as_str(),
            role: message.role.as_str(),
            content: &message.content,
            created_at: message.created_at,
        };

        let response = self
            .request(reqwest::Method::POST)
            .header("Prefer", "return=minimal")
            .json(&[row])
            .send()
            .await
            .map_err(|e| AgentError::store("append", e))?;

        Self::check(response, "append").await?;
        Ok(())
    }
}
