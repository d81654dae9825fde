//! Sync orchestration engine.
//!
//! Composes the entitlement directory, the template catalog, and the user's
//! workspace behind trait seams so the reconciliation logic is independent
//! of Postgres. The Postgres adapters live in [`stores`].
//!
//! One invocation walks a fixed sequence: resolve entitlement, resolve the
//! workspace user, ensure the root folder, fetch the catalog, partition by
//! access, reconcile copies, build the report. A missing workspace account
//! short-circuits to a `skipped` report -- that is a business outcome, not
//! a fault.

pub mod stores;

use std::sync::Arc;

use async_trait::async_trait;

use flowsync_core::access::{self, AccessDecision, DenialReason};
use flowsync_core::entitlement::UserEntitlement;
use flowsync_core::error::CoreError;
use flowsync_core::report::{
    AccessVerdict, StatusSnapshot, SyncAction, SyncOutcome, SyncReport, SyncedItem,
    UpgradeOpportunity,
};
use flowsync_core::template::{Template, TemplateAccess};
use flowsync_core::types::EntityId;
use flowsync_core::workspace::{CopiedFlow, WorkspaceUser};

/// Resolves a user id to their entitlement snapshot in the account store.
#[async_trait]
pub trait EntitlementDirectory: Send + Sync {
    /// `Ok(None)` when the user is unknown to the account store.
    async fn entitlement(&self, user_id: EntityId) -> Result<Option<UserEntitlement>, CoreError>;
}

/// Reads the admin-owned template catalog, metadata already parsed,
/// in stable (folder name, template name) order.
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    async fn list_templates(&self) -> Result<Vec<Template>, CoreError>;
}

/// Reads and writes the target user's folders and template copies.
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    /// Locate a workspace user by the cross-referenced handle (email).
    async fn find_user(&self, handle: &str) -> Result<Option<WorkspaceUser>, CoreError>;

    /// Get or create a folder keyed by (owner, name, parent). Returns the
    /// folder id and whether this call created it. Must be atomic per key.
    async fn get_or_create_folder(
        &self,
        owner: EntityId,
        name: &str,
        parent_id: Option<EntityId>,
    ) -> Result<(EntityId, bool), CoreError>;

    /// `true` if the owner already has a copy with this name.
    async fn copy_exists(&self, owner: EntityId, template_name: &str) -> Result<bool, CoreError>;

    /// Copy a template into the owner's folder. Always inserts a new row.
    async fn copy_template(
        &self,
        owner: EntityId,
        template: &Template,
        folder_id: EntityId,
    ) -> Result<EntityId, CoreError>;

    /// Copy a template unless a same-named copy exists; `None` when one
    /// does. Must be atomic per (owner, template name).
    async fn copy_template_if_absent(
        &self,
        owner: EntityId,
        template: &Template,
        folder_id: EntityId,
    ) -> Result<Option<EntityId>, CoreError>;

    /// All copies owned by the user.
    async fn list_copies(&self, owner: EntityId) -> Result<Vec<CopiedFlow>, CoreError>;
}

/// Engine tunables, sourced from server configuration.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Root folder created in each user's workspace.
    pub user_folder_name: String,
    /// Upgrade-path URL attached to denied access verdicts.
    pub upgrade_url: String,
}

/// Orchestrates the access decision and idempotent copy procedure.
pub struct SyncEngine {
    directory: Arc<dyn EntitlementDirectory>,
    catalog: Arc<dyn TemplateCatalog>,
    workspace: Arc<dyn WorkspaceStore>,
    options: EngineOptions,
}

/// Outcome of reconciling one accessible template.
enum Reconciled {
    Copied(SyncedItem),
    UpToDate,
}

impl SyncEngine {
    pub fn new(
        directory: Arc<dyn EntitlementDirectory>,
        catalog: Arc<dyn TemplateCatalog>,
        workspace: Arc<dyn WorkspaceStore>,
        options: EngineOptions,
    ) -> Self {
        Self {
            directory,
            catalog,
            workspace,
            options,
        }
    }

    /// Sync the accessible subset of the catalog into the user's workspace.
    ///
    /// Idempotent for `force_sync = false`: a second run on an unchanged
    /// catalog creates nothing and counts every accessible template as
    /// up-to-date. With `force_sync = true`, accessible templates are
    /// re-copied as new rows (action `updated` when a prior copy existed).
    pub async fn sync_user(
        &self,
        user_id: EntityId,
        force_sync: bool,
    ) -> Result<SyncReport, CoreError> {
        let entitlement = self.resolve_entitlement(user_id).await?;

        tracing::info!(
            %user_id,
            tier = %entitlement.tier,
            features = ?entitlement.enabled_features,
            force_sync,
            "Starting template sync"
        );

        // A user known to the account store but absent from the workspace
        // store has simply never signed in there. Legitimate outcome.
        let Some(ws_user) = self.workspace.find_user(&entitlement.email).await? else {
            let message = format!(
                "User {user_id} has no workspace account yet. \
                 They must sign in to the workspace before templates can be synced."
            );
            tracing::warn!(%user_id, "Sync skipped: {message}");
            return Ok(SyncReport::skipped(
                user_id,
                entitlement.tier,
                entitlement.enabled_features,
                message,
            ));
        };

        let folder_name = &self.options.user_folder_name;
        let (folder_id, folder_created) = self
            .workspace
            .get_or_create_folder(ws_user.id, folder_name, None)
            .await?;
        let folders_created = if folder_created {
            vec![folder_name.clone()]
        } else {
            Vec::new()
        };

        let templates = self.catalog.list_templates().await?;
        tracing::info!(count = templates.len(), "Fetched admin template catalog");

        let (accessible, flows_denied) = partition_by_access(&templates, &entitlement);
        tracing::info!(
            accessible = accessible.len(),
            denied = flows_denied.len(),
            "Access check complete"
        );

        let mut flows_created = Vec::new();
        let mut flows_updated = Vec::new();
        let mut flows_up_to_date = 0;

        for template in &accessible {
            match self
                .reconcile_one(ws_user.id, template, folder_id, force_sync, folder_name)
                .await
            {
                Ok(Reconciled::UpToDate) => flows_up_to_date += 1,
                Ok(Reconciled::Copied(item)) => match item.action {
                    SyncAction::Updated => flows_updated.push(item),
                    _ => flows_created.push(item),
                },
                // A single failed copy must not abort the batch. The failed
                // template is omitted from the report entirely, which masks
                // the failure in the totals.
                Err(e) => {
                    tracing::error!(
                        template = %template.name,
                        error = %e,
                        "Failed to copy template, continuing with remaining templates"
                    );
                }
            }
        }

        let total_templates_synced =
            flows_created.len() + flows_updated.len() + flows_up_to_date;

        let report = SyncReport {
            user_id,
            sync_timestamp: chrono::Utc::now(),
            status: SyncOutcome::Success,
            message: None,
            total_templates_available: templates.len(),
            total_templates_accessible: accessible.len(),
            total_templates_synced,
            flows_created,
            flows_updated,
            flows_up_to_date,
            flows_denied,
            subscription_tier: entitlement.tier,
            enabled_features: entitlement.enabled_features,
            folders_created,
        };

        tracing::info!(
            %user_id,
            created = report.flows_created.len(),
            updated = report.flows_updated.len(),
            up_to_date = report.flows_up_to_date,
            denied = report.flows_denied.len(),
            "Template sync completed"
        );
        Ok(report)
    }

    /// Recompute the user's current access without performing any writes.
    pub async fn sync_status(&self, user_id: EntityId) -> Result<StatusSnapshot, CoreError> {
        let entitlement = self.resolve_entitlement(user_id).await?;

        // No workspace account yet: access counts still apply, flow count is zero.
        let total_flows = match self.workspace.find_user(&entitlement.email).await? {
            Some(ws_user) => self.workspace.list_copies(ws_user.id).await?.len(),
            None => 0,
        };

        let templates = self.catalog.list_templates().await?;

        let mut accessible_templates = 0;
        let mut denied_templates = 0;
        let mut upgrade_opportunities = Vec::new();

        for template in &templates {
            match access::evaluate(&template.meta, &entitlement) {
                AccessDecision::Granted => accessible_templates += 1,
                AccessDecision::Denied(reason) => {
                    denied_templates += 1;
                    // Only tier denials are upgrade opportunities; feature
                    // enablement and unknown categories are not fixed by paying.
                    if let DenialReason::TierTooLow { required, .. } = reason {
                        upgrade_opportunities.push(UpgradeOpportunity {
                            template_name: template.name.clone(),
                            required_tier: required,
                            required_feature: required_feature_of(template),
                            features: template.meta.features.clone(),
                        });
                    }
                }
            }
        }

        Ok(StatusSnapshot {
            user_id,
            subscription_tier: entitlement.tier,
            enabled_features: entitlement.enabled_features,
            total_flows,
            accessible_templates,
            denied_templates,
            upgrade_opportunities,
        })
    }

    /// Verdict for a single template. An unknown template id yields a
    /// not-found verdict, not an error.
    pub async fn check_access(
        &self,
        user_id: EntityId,
        template_id: EntityId,
    ) -> Result<AccessVerdict, CoreError> {
        let entitlement = self.resolve_entitlement(user_id).await?;
        let templates = self.catalog.list_templates().await?;

        let Some(template) = templates.iter().find(|t| t.id == template_id) else {
            return Ok(AccessVerdict {
                has_access: false,
                template_id,
                template_name: "Unknown".to_string(),
                reason: Some("Template not found".to_string()),
                required_tier: None,
                required_feature: None,
                upgrade_url: None,
            });
        };

        Ok(match access::evaluate(&template.meta, &entitlement) {
            AccessDecision::Granted => AccessVerdict {
                has_access: true,
                template_id,
                template_name: template.name.clone(),
                reason: None,
                required_tier: None,
                required_feature: None,
                upgrade_url: None,
            },
            AccessDecision::Denied(reason) => {
                let required_tier = match &template.meta.access {
                    TemplateAccess::Gated { required_tier, .. } => Some(*required_tier),
                    _ => None,
                };
                AccessVerdict {
                    has_access: false,
                    template_id,
                    template_name: template.name.clone(),
                    reason: Some(reason.to_string()),
                    required_tier,
                    required_feature: required_feature_of(template),
                    upgrade_url: Some(self.options.upgrade_url.clone()),
                }
            }
        })
    }

    async fn resolve_entitlement(&self, user_id: EntityId) -> Result<UserEntitlement, CoreError> {
        self.directory
            .entitlement(user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "user",
                id: user_id,
            })
    }

    /// Reconcile one accessible template against the user's workspace.
    ///
    /// Non-force path uses the store's atomic insert-if-absent, so a
    /// concurrent sync losing the race simply counts the template as
    /// up-to-date. Force path always inserts a new row -- the accumulating
    /// "update" behavior is deliberate (see DESIGN.md).
    async fn reconcile_one(
        &self,
        owner: EntityId,
        template: &Template,
        folder_id: EntityId,
        force_sync: bool,
        folder_name: &str,
    ) -> Result<Reconciled, CoreError> {
        let exists = self.workspace.copy_exists(owner, &template.name).await?;

        if exists && !force_sync {
            tracing::debug!(template = %template.name, "Copy already present, skipping");
            return Ok(Reconciled::UpToDate);
        }

        let (flow_id, action) = if force_sync {
            let id = self
                .workspace
                .copy_template(owner, template, folder_id)
                .await?;
            let action = if exists {
                SyncAction::Updated
            } else {
                SyncAction::Created
            };
            (id, action)
        } else {
            match self
                .workspace
                .copy_template_if_absent(owner, template, folder_id)
                .await?
            {
                Some(id) => (id, SyncAction::Created),
                // Lost a race with a concurrent sync for the same user.
                None => return Ok(Reconciled::UpToDate),
            }
        };

        Ok(Reconciled::Copied(SyncedItem {
            flow_id: Some(flow_id),
            template_id: template.id,
            name: template.name.clone(),
            template_version: template.meta.version.clone(),
            folder: folder_name.to_string(),
            action,
            denial_reason: None,
        }))
    }
}

/// Split the catalog into accessible templates and denied items, each denial
/// carrying its specific human-readable reason.
fn partition_by_access<'a>(
    templates: &'a [Template],
    entitlement: &UserEntitlement,
) -> (Vec<&'a Template>, Vec<SyncedItem>) {
    let mut accessible = Vec::new();
    let mut denied = Vec::new();

    for template in templates {
        match access::evaluate(&template.meta, entitlement) {
            AccessDecision::Granted => accessible.push(template),
            AccessDecision::Denied(reason) => denied.push(SyncedItem {
                flow_id: None,
                template_id: template.id,
                name: template.name.clone(),
                template_version: template.meta.version.clone(),
                folder: template
                    .folder_name
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
                action: SyncAction::Denied,
                denial_reason: Some(reason.to_string()),
            }),
        }
    }

    (accessible, denied)
}

fn required_feature_of(template: &Template) -> Option<flowsync_core::tier::FeatureType> {
    match &template.meta.access {
        TemplateAccess::Gated {
            required_feature, ..
        } => *required_feature,
        _ => None,
    }
}
