//! Agent gateway HTTP server
//!
//! Axum server exposing the chat agent: `GET /` for liveness and
//! `POST /chat-agent` for one conversational turn.

mod app;
mod config;
mod error;
mod gateway;
mod handlers;
mod state;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{
    AgentBuilder, ConversationStore, MemoryConversationStore, ReminderTool, ToolRegistry,
};
use agent_runtime::{OpenAiProvider, SupabaseStore};

use crate::config::GatewayConfig;
use crate::gateway::{Gateway, GatewaySettings};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = GatewayConfig::from_env()?;

    // Completion provider
    let provider = Arc::new(OpenAiProvider::new(config.openai.clone())?);
    tracing::info!(model = %provider.model(), "✓ Completion provider configured");

    // Conversation store
    let store: Arc<dyn ConversationStore> = match config.store.clone() {
        Some(store) => {
            tracing::info!(
                url = %store.base_url,
                table = %store.table,
                "✓ Supabase store configured"
            );
            Arc::new(SupabaseStore::new(store)?)
        }
        None => {
            tracing::warn!("⚠ SUPABASE_URL not set - history is kept in memory and lost on restart");
            Arc::new(MemoryConversationStore::new())
        }
    };

    // Tools
    let mut tools = ToolRegistry::new();
    tools.register(ReminderTool)?;
    let names = tools.names();
    tracing::info!("Registered {} tools:", names.len());
    for name in names {
        tracing::info!("  • {}", name);
    }

    let agent = AgentBuilder::new()
        .provider(provider)
        .tools(Arc::new(tools))
        .max_tool_calls_per_turn(config.agent.max_tool_calls_per_turn)
        .provider_timeout(config.agent.provider_timeout)
        .provider_retries(config.agent.provider_retries)
        .build()?;

    let gateway = Gateway::new(
        Arc::new(agent),
        store,
        GatewaySettings {
            history_limit: config.history_limit,
            store_timeout: config.store_timeout,
        },
    );

    let app = app::router(AppState {
        gateway: Arc::new(gateway),
    });

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 agent gateway running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /            - Liveness");
    tracing::info!("  POST /chat-agent  - Chat turn");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
