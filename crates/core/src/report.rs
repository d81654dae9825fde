//! Structured results returned by the sync engine.

use serde::Serialize;

use crate::tier::{FeatureType, SubscriptionTier};
use crate::types::{EntityId, Timestamp};

/// What happened to a single template during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Created,
    Updated,
    Skipped,
    Denied,
}

/// Per-template outcome.
#[derive(Debug, Clone, Serialize)]
pub struct SyncedItem {
    /// The resulting copy id; `None` for denied items.
    pub flow_id: Option<EntityId>,
    pub template_id: EntityId,
    pub name: String,
    pub template_version: String,
    pub folder: String,
    pub action: SyncAction,
    pub denial_reason: Option<String>,
}

/// Overall outcome of one sync invocation.
///
/// `Skipped` is a legitimate business outcome (the user has no workspace
/// account yet), not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcome {
    Success,
    Partial,
    Skipped,
    Failed,
}

/// Aggregate result of one sync invocation. Constructed once and returned,
/// never stored.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub user_id: EntityId,
    pub sync_timestamp: Timestamp,
    pub status: SyncOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub flows_created: Vec<SyncedItem>,
    pub flows_updated: Vec<SyncedItem>,
    pub flows_up_to_date: usize,
    pub flows_denied: Vec<SyncedItem>,

    pub total_templates_available: usize,
    pub total_templates_accessible: usize,
    pub total_templates_synced: usize,

    pub subscription_tier: SubscriptionTier,
    pub enabled_features: Vec<FeatureType>,

    pub folders_created: Vec<String>,
}

impl SyncReport {
    /// An empty report for a user with no workspace account: status is
    /// `skipped`, all totals are zero, and `message` explains what the user
    /// must do before templates can be synced.
    pub fn skipped(
        user_id: EntityId,
        tier: SubscriptionTier,
        enabled_features: Vec<FeatureType>,
        message: String,
    ) -> Self {
        SyncReport {
            user_id,
            sync_timestamp: chrono::Utc::now(),
            status: SyncOutcome::Skipped,
            message: Some(message),
            flows_created: Vec::new(),
            flows_updated: Vec::new(),
            flows_up_to_date: 0,
            flows_denied: Vec::new(),
            total_templates_available: 0,
            total_templates_accessible: 0,
            total_templates_synced: 0,
            subscription_tier: tier,
            enabled_features,
            folders_created: Vec::new(),
        }
    }
}

/// A template denied purely for tier reasons -- something the user could
/// unlock by upgrading.
#[derive(Debug, Clone, Serialize)]
pub struct UpgradeOpportunity {
    pub template_name: String,
    pub required_tier: SubscriptionTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_feature: Option<FeatureType>,
    pub features: Vec<String>,
}

/// Read-only view of a user's current access, computed without writes.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub user_id: EntityId,
    pub subscription_tier: SubscriptionTier,
    pub enabled_features: Vec<FeatureType>,
    pub total_flows: usize,
    pub accessible_templates: usize,
    pub denied_templates: usize,
    pub upgrade_opportunities: Vec<UpgradeOpportunity>,
}

/// Verdict for a single-template access check.
#[derive(Debug, Clone, Serialize)]
pub struct AccessVerdict {
    pub has_access: bool,
    pub template_id: EntityId,
    pub template_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_tier: Option<SubscriptionTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_feature: Option<FeatureType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_url: Option<String>,
}
