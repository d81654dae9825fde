//! Resolved user entitlement from the account store.

use serde::Serialize;

use crate::tier::{FeatureType, SubscriptionTier, TierLimits};
use crate::types::EntityId;

/// A user's resolved access snapshot: tier, enabled features, and status.
///
/// Fetched fresh per request and immutable for the duration of one sync.
/// `email` is the cross-reference handle used to locate the same person in
/// the workspace store, which assigns its own user ids.
#[derive(Debug, Clone, Serialize)]
pub struct UserEntitlement {
    pub user_id: EntityId,
    pub email: String,
    pub tier: SubscriptionTier,
    pub enabled_features: Vec<FeatureType>,
    pub tier_limits: TierLimits,
    pub is_active: bool,
    pub tenant_id: Option<EntityId>,
}
