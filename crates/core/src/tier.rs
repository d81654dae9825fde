//! Subscription tiers, gated features, and the pure access policy.
//!
//! Tier comparison is always by [`SubscriptionTier::rank`]; neither enum
//! declaration order nor the wire string participates in any comparison.
//! Legacy tier names from the account store (`free`, `pro`, `agency`) are
//! mapped onto canonical tiers at the parsing boundary and nowhere else.

use serde::{Deserialize, Serialize};

/// Canonical subscription tiers, lowest to highest.
///
/// Feature access by tier:
/// - Starter: Seo + Content only
/// - Professional: PaidAds only (intentional carve-out, see [`allowed_features`])
/// - Business: all four features
/// - Enterprise: all four features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Starter,
    Professional,
    Business,
    Enterprise,
}

impl SubscriptionTier {
    /// Explicit rank used for "at least tier X" comparisons.
    pub fn rank(self) -> u8 {
        match self {
            SubscriptionTier::Starter => 0,
            SubscriptionTier::Professional => 1,
            SubscriptionTier::Business => 2,
            SubscriptionTier::Enterprise => 3,
        }
    }

    /// Parse an external tier string, mapping legacy aliases onto canonical
    /// tiers. Unknown or empty input defaults to the lowest tier.
    ///
    /// Aliases: `free` -> Starter, `pro` -> Professional, `agency` -> Enterprise.
    pub fn from_external(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "free" | "starter" => SubscriptionTier::Starter,
            "pro" | "professional" => SubscriptionTier::Professional,
            "business" => SubscriptionTier::Business,
            "enterprise" | "agency" => SubscriptionTier::Enterprise,
            _ => SubscriptionTier::Starter,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionTier::Starter => "starter",
            SubscriptionTier::Professional => "professional",
            SubscriptionTier::Business => "business",
            SubscriptionTier::Enterprise => "enterprise",
        }
    }
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gated capabilities a template may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    Seo,
    Content,
    PaidAds,
    AudienceIntelligence,
}

impl FeatureType {
    /// Parse an external feature string. Unknown strings return `None`;
    /// callers skip them rather than failing the whole lookup.
    pub fn from_external(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "seo" => Some(FeatureType::Seo),
            "content" => Some(FeatureType::Content),
            "paid_ads" => Some(FeatureType::PaidAds),
            "audience_intelligence" => Some(FeatureType::AudienceIntelligence),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureType::Seo => "seo",
            FeatureType::Content => "content",
            FeatureType::PaidAds => "paid_ads",
            FeatureType::AudienceIntelligence => "audience_intelligence",
        }
    }
}

impl std::fmt::Display for FeatureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource quotas attached to a tier. Informational only; the access
/// decision never consults these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierLimits {
    pub max_flows: u32,
    pub max_features: u32,
    pub max_campaigns: u32,
    pub api_rate_limit: u32,
}

/// `true` if `user` meets or exceeds `required`, comparing by rank.
pub fn at_least(user: SubscriptionTier, required: SubscriptionTier) -> bool {
    user.rank() >= required.rank()
}

/// Features a tier permits, independent of per-user enablement.
///
/// Professional permits only PaidAds even though Starter permits Seo and
/// Content: the table is not monotonic between those two tiers. That
/// asymmetry is the product's pricing model, not a bug.
pub fn allowed_features(tier: SubscriptionTier) -> &'static [FeatureType] {
    const STARTER: &[FeatureType] = &[FeatureType::Seo, FeatureType::Content];
    const PROFESSIONAL: &[FeatureType] = &[FeatureType::PaidAds];
    const ALL: &[FeatureType] = &[
        FeatureType::Seo,
        FeatureType::Content,
        FeatureType::PaidAds,
        FeatureType::AudienceIntelligence,
    ];

    match tier {
        SubscriptionTier::Starter => STARTER,
        SubscriptionTier::Professional => PROFESSIONAL,
        SubscriptionTier::Business | SubscriptionTier::Enterprise => ALL,
    }
}

/// A user may use `required` only when the tier table permits it AND the
/// user has it enabled. `None` means the template requires no feature.
pub fn has_feature_access(
    tier: SubscriptionTier,
    enabled: &[FeatureType],
    required: Option<FeatureType>,
) -> bool {
    let Some(feature) = required else {
        return true;
    };
    allowed_features(tier).contains(&feature) && enabled.contains(&feature)
}

/// Quotas for a tier. Total over all tiers.
pub fn tier_limits(tier: SubscriptionTier) -> TierLimits {
    match tier {
        SubscriptionTier::Starter => TierLimits {
            max_flows: 5,
            max_features: 0,
            max_campaigns: 1,
            api_rate_limit: 100,
        },
        SubscriptionTier::Professional => TierLimits {
            max_flows: 50,
            max_features: 2,
            max_campaigns: 10,
            api_rate_limit: 1_000,
        },
        SubscriptionTier::Business => TierLimits {
            max_flows: 200,
            max_features: 4,
            max_campaigns: 100,
            api_rate_limit: 10_000,
        },
        SubscriptionTier::Enterprise => TierLimits {
            max_flows: 1_000,
            max_features: 4,
            max_campaigns: 1_000,
            api_rate_limit: 50_000,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TIERS: [SubscriptionTier; 4] = [
        SubscriptionTier::Starter,
        SubscriptionTier::Professional,
        SubscriptionTier::Business,
        SubscriptionTier::Enterprise,
    ];

    #[test]
    fn test_at_least_is_reflexive() {
        for tier in ALL_TIERS {
            assert!(at_least(tier, tier));
        }
    }

    #[test]
    fn test_at_least_is_antisymmetric_across_ranks() {
        for a in ALL_TIERS {
            for b in ALL_TIERS {
                if a.rank() < b.rank() {
                    assert!(!at_least(a, b), "{a} should not satisfy {b}");
                    assert!(at_least(b, a), "{b} should satisfy {a}");
                }
            }
        }
    }

    #[test]
    fn test_legacy_aliases_map_to_canonical_ranks() {
        assert_eq!(SubscriptionTier::from_external("free"), SubscriptionTier::Starter);
        assert_eq!(
            SubscriptionTier::from_external("pro"),
            SubscriptionTier::Professional
        );
        assert_eq!(
            SubscriptionTier::from_external("agency"),
            SubscriptionTier::Enterprise
        );
        assert_eq!(
            SubscriptionTier::from_external("Business"),
            SubscriptionTier::Business
        );
    }

    #[test]
    fn test_unknown_tier_defaults_to_lowest_rank() {
        assert_eq!(SubscriptionTier::from_external("platinum").rank(), 0);
        assert_eq!(SubscriptionTier::from_external("").rank(), 0);
    }

    #[test]
    fn test_allowed_features_is_total() {
        for tier in ALL_TIERS {
            // Every tier has a defined (possibly small) feature set.
            let _ = allowed_features(tier);
            let _ = tier_limits(tier);
        }
    }

    #[test]
    fn test_professional_carve_out_is_preserved() {
        // Starter permits Seo + Content; Professional permits only PaidAds.
        // The table is intentionally not monotonic between these two tiers.
        let starter = allowed_features(SubscriptionTier::Starter);
        let professional = allowed_features(SubscriptionTier::Professional);

        assert!(starter.contains(&FeatureType::Seo));
        assert!(starter.contains(&FeatureType::Content));
        assert!(!starter.contains(&FeatureType::PaidAds));

        assert_eq!(professional, &[FeatureType::PaidAds]);
        assert!(!professional.contains(&FeatureType::Seo));
    }

    #[test]
    fn test_business_and_enterprise_permit_all_features() {
        for tier in [SubscriptionTier::Business, SubscriptionTier::Enterprise] {
            assert_eq!(allowed_features(tier).len(), 4);
        }
    }

    #[test]
    fn test_has_feature_access_requires_both_tier_and_enablement() {
        let enabled = [FeatureType::PaidAds];

        // No required feature: always accessible.
        assert!(has_feature_access(SubscriptionTier::Starter, &[], None));

        // Enabled AND permitted by tier.
        assert!(has_feature_access(
            SubscriptionTier::Professional,
            &enabled,
            Some(FeatureType::PaidAds)
        ));

        // Enabled but the tier table disallows it.
        assert!(!has_feature_access(
            SubscriptionTier::Starter,
            &enabled,
            Some(FeatureType::PaidAds)
        ));

        // Permitted by tier but not enabled for the user.
        assert!(!has_feature_access(
            SubscriptionTier::Business,
            &[],
            Some(FeatureType::PaidAds)
        ));
    }

    #[test]
    fn test_unknown_feature_strings_are_skipped() {
        assert_eq!(FeatureType::from_external("seo"), Some(FeatureType::Seo));
        assert_eq!(FeatureType::from_external("telepathy"), None);
    }
}
