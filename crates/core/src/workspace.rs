//! Workspace-store domain types.

use crate::types::{EntityId, Timestamp};

/// A user record in the workspace store, located by email handle.
#[derive(Debug, Clone)]
pub struct WorkspaceUser {
    pub id: EntityId,
    pub username: String,
    pub is_active: bool,
}

/// A template copy living in a user's workspace.
#[derive(Debug, Clone)]
pub struct CopiedFlow {
    pub id: EntityId,
    pub name: String,
    pub folder_id: Option<EntityId>,
    pub updated_at: Option<Timestamp>,
}
