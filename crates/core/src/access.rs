//! Per-template access decision.
//!
//! Free-tier templates are always accessible. Gated templates require the
//! tier gate first, then the feature gate; the tier gate dominates, so a
//! user whose tier disallows a feature is denied even when that feature
//! appears in their enabled set.

use crate::entitlement::UserEntitlement;
use crate::template::{TemplateAccess, TemplateMetadata};
use crate::tier::{allowed_features, at_least, has_feature_access, FeatureType, SubscriptionTier};

/// Why a template was denied. The variant (not the message text) drives
/// downstream classification such as upgrade-opportunity detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    /// The user's tier ranks below the template's required tier.
    TierTooLow {
        required: SubscriptionTier,
        current: SubscriptionTier,
    },
    /// The required feature is not usable: either the tier table disallows
    /// it or the user has not enabled it.
    FeatureNotAccessible {
        feature: Option<FeatureType>,
        tier: SubscriptionTier,
    },
    /// The sidecar carried a category this service does not recognize.
    UnknownCategory(String),
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenialReason::TierTooLow { required, current } => {
                write!(f, "Requires {required} tier or higher (current: {current})")
            }
            DenialReason::FeatureNotAccessible { feature, tier } => {
                let feature = feature.map_or("unknown", FeatureType::as_str);
                let allowed: Vec<&str> = allowed_features(*tier)
                    .iter()
                    .map(|a| a.as_str())
                    .collect();
                write!(
                    f,
                    "Feature '{feature}' not accessible. Tier {tier} allows: {allowed:?}"
                )
            }
            DenialReason::UnknownCategory(category) => {
                write!(f, "Unknown template category: {category}")
            }
        }
    }
}

/// Outcome of evaluating one template against one entitlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Denied(DenialReason),
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted)
    }
}

/// Evaluate a template's parsed metadata against a user's entitlement.
///
/// Pure and total: every category variant maps to a decision, never an error.
pub fn evaluate(meta: &TemplateMetadata, entitlement: &UserEntitlement) -> AccessDecision {
    match &meta.access {
        TemplateAccess::FreeTier => AccessDecision::Granted,

        TemplateAccess::Gated {
            required_tier,
            required_feature,
        } => {
            if !at_least(entitlement.tier, *required_tier) {
                return AccessDecision::Denied(DenialReason::TierTooLow {
                    required: *required_tier,
                    current: entitlement.tier,
                });
            }

            if !has_feature_access(
                entitlement.tier,
                &entitlement.enabled_features,
                *required_feature,
            ) {
                return AccessDecision::Denied(DenialReason::FeatureNotAccessible {
                    feature: *required_feature,
                    tier: entitlement.tier,
                });
            }

            AccessDecision::Granted
        }

        TemplateAccess::Unknown { category } => {
            AccessDecision::Denied(DenialReason::UnknownCategory(category.clone()))
        }
    }
}
