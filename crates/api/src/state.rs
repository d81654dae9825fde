use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::SyncEngine;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Pool for the account store (tiers, feature enablement).
    pub account_pool: flowsync_db::DbPool,
    /// Pool for the workspace store (templates, folders, copies).
    pub workspace_pool: flowsync_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Sync orchestration engine wired to the two stores.
    pub engine: Arc<SyncEngine>,
}
