//! Postgres-backed implementations of the engine's store seams.
//!
//! Each adapter wraps a pool for one of the two independent stores and
//! delegates to the repositories in `flowsync_db`, mapping `sqlx::Error`
//! onto [`CoreError::Upstream`] at this boundary.

use async_trait::async_trait;

use flowsync_core::entitlement::UserEntitlement;
use flowsync_core::error::CoreError;
use flowsync_core::template::{self, Template};
use flowsync_core::tier::{tier_limits, FeatureType, SubscriptionTier};
use flowsync_core::types::EntityId;
use flowsync_core::workspace::{CopiedFlow, WorkspaceUser};
use flowsync_db::models::workspace::NewFlowCopy;
use flowsync_db::repositories::{AccountRepo, CatalogRepo, WorkspaceRepo};
use flowsync_db::DbPool;

use super::{EntitlementDirectory, TemplateCatalog, WorkspaceStore};

fn upstream(err: sqlx::Error) -> CoreError {
    CoreError::Upstream(err.to_string())
}

/// Entitlement lookups against the account store.
pub struct PgEntitlementDirectory {
    pool: DbPool,
}

impl PgEntitlementDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntitlementDirectory for PgEntitlementDirectory {
    async fn entitlement(&self, user_id: EntityId) -> Result<Option<UserEntitlement>, CoreError> {
        let Some(row) = AccountRepo::get_user(&self.pool, user_id)
            .await
            .map_err(upstream)?
        else {
            tracing::warn!(%user_id, "User not found in account store");
            return Ok(None);
        };

        let tier = SubscriptionTier::from_external(row.subscription_tier.as_deref().unwrap_or(""));

        let mut enabled_features = Vec::new();
        for raw in AccountRepo::list_enabled_features(&self.pool, user_id)
            .await
            .map_err(upstream)?
        {
            match FeatureType::from_external(&raw) {
                Some(feature) => enabled_features.push(feature),
                None => tracing::warn!(feature = %raw, "Unknown feature type in account store"),
            }
        }

        let tenant_id = AccountRepo::get_tenant_id(&self.pool, user_id)
            .await
            .map_err(upstream)?;

        tracing::info!(
            %user_id,
            tier = %tier,
            features = ?enabled_features,
            "Resolved user entitlement"
        );

        Ok(Some(UserEntitlement {
            user_id: row.id,
            email: row.email,
            tier,
            enabled_features,
            tier_limits: tier_limits(tier),
            is_active: row.is_active.unwrap_or(true),
            tenant_id,
        }))
    }
}

/// Template catalog reads against the workspace store.
pub struct PgTemplateCatalog {
    pool: DbPool,
    admin_username: String,
}

impl PgTemplateCatalog {
    pub fn new(pool: DbPool, admin_username: String) -> Self {
        Self {
            pool,
            admin_username,
        }
    }
}

#[async_trait]
impl TemplateCatalog for PgTemplateCatalog {
    async fn list_templates(&self) -> Result<Vec<Template>, CoreError> {
        let rows = CatalogRepo::list_admin_templates(&self.pool, &self.admin_username)
            .await
            .map_err(upstream)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let meta = template::parse_description_metadata(row.description.as_deref());
                Template {
                    id: row.id,
                    name: row.name,
                    data: row.data,
                    description: row.description,
                    folder_name: row.folder_name,
                    updated_at: row.updated_at,
                    meta,
                }
            })
            .collect())
    }
}

/// Folder and copy operations against the workspace store.
pub struct PgWorkspaceStore {
    pool: DbPool,
}

impl PgWorkspaceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkspaceStore for PgWorkspaceStore {
    async fn find_user(&self, handle: &str) -> Result<Option<WorkspaceUser>, CoreError> {
        let row = WorkspaceRepo::find_user_by_username(&self.pool, handle)
            .await
            .map_err(upstream)?;

        Ok(row.map(|r| WorkspaceUser {
            id: r.id,
            username: r.username,
            is_active: r.is_active,
        }))
    }

    async fn get_or_create_folder(
        &self,
        owner: EntityId,
        name: &str,
        parent_id: Option<EntityId>,
    ) -> Result<(EntityId, bool), CoreError> {
        WorkspaceRepo::get_or_create_folder(&self.pool, owner, name, parent_id)
            .await
            .map_err(upstream)
    }

    async fn copy_exists(&self, owner: EntityId, template_name: &str) -> Result<bool, CoreError> {
        WorkspaceRepo::flow_exists(&self.pool, owner, template_name)
            .await
            .map_err(upstream)
    }

    async fn copy_template(
        &self,
        owner: EntityId,
        template: &Template,
        folder_id: EntityId,
    ) -> Result<EntityId, CoreError> {
        let description = template::clean_description(template.description.as_deref());
        WorkspaceRepo::insert_flow(
            &self.pool,
            owner,
            &NewFlowCopy {
                name: &template.name,
                description: &description,
                data: &template.data,
                folder_id,
            },
        )
        .await
        .map_err(upstream)
    }

    async fn copy_template_if_absent(
        &self,
        owner: EntityId,
        template: &Template,
        folder_id: EntityId,
    ) -> Result<Option<EntityId>, CoreError> {
        let description = template::clean_description(template.description.as_deref());
        WorkspaceRepo::insert_flow_if_absent(
            &self.pool,
            owner,
            &NewFlowCopy {
                name: &template.name,
                description: &description,
                data: &template.data,
                folder_id,
            },
        )
        .await
        .map_err(upstream)
    }

    async fn list_copies(&self, owner: EntityId) -> Result<Vec<CopiedFlow>, CoreError> {
        let rows = WorkspaceRepo::list_flows(&self.pool, owner)
            .await
            .map_err(upstream)?;

        Ok(rows
            .into_iter()
            .map(|r| CopiedFlow {
                id: r.id,
                name: r.name,
                folder_id: r.folder_id,
                updated_at: r.updated_at,
            })
            .collect())
    }
}
