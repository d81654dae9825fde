//! Row types for the workspace store.

use flowsync_core::types::Timestamp;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the workspace store's `"user"` table.
#[derive(Debug, Clone, FromRow)]
pub struct WorkspaceUserRow {
    pub id: Uuid,
    pub username: String,
    pub is_active: bool,
}

/// A raw admin template row from the `flow` table, joined with its folder.
/// The metadata sidecar in `description` is parsed by the catalog adapter,
/// not here.
#[derive(Debug, Clone, FromRow)]
pub struct AdminTemplateRow {
    pub id: Uuid,
    pub name: String,
    pub data: serde_json::Value,
    pub description: Option<String>,
    pub updated_at: Option<Timestamp>,
    pub folder_name: Option<String>,
}

/// A copy living in a user's workspace.
#[derive(Debug, Clone, FromRow)]
pub struct FlowRow {
    pub id: Uuid,
    pub name: String,
    pub folder_id: Option<Uuid>,
    pub updated_at: Option<Timestamp>,
}

/// Fields inserted when copying a template into a user's workspace.
#[derive(Debug, Clone)]
pub struct NewFlowCopy<'a> {
    pub name: &'a str,
    /// User-facing description with the metadata sidecar stripped.
    pub description: &'a str,
    pub data: &'a serde_json::Value,
    pub folder_id: Uuid,
}
