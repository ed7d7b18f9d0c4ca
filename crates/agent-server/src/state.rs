//! Application State

use std::sync::Arc;

use crate::gateway::Gateway;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Chat gateway (agent, store and settings)
    pub gateway: Arc<Gateway>,
}
