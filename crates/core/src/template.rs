//! Admin templates and the metadata sidecar embedded in their descriptions.
//!
//! Access metadata rides inside the free-text description field as an
//! optional JSON block:
//!
//! ```json
//! {
//!   "user_description": "Keyword research starter flow",
//!   "template_metadata": {
//!     "category": "gated",
//!     "required_tier": "business",
//!     "required_feature": "seo",
//!     "features": ["keyword_research"],
//!     "version": "1.1.0"
//!   }
//! }
//! ```
//!
//! Parsing never fails the catalog read: a plain-text or malformed
//! description degrades to free-tier defaults. The category discriminator is
//! decided here, once, as a closed variant -- downstream code never
//! re-interprets the raw string.

use serde::{Deserialize, Serialize};

use crate::tier::{FeatureType, SubscriptionTier};
use crate::types::{EntityId, Timestamp};

/// Default version when the sidecar is absent or carries none.
pub const DEFAULT_TEMPLATE_VERSION: &str = "1.0.0";

/// Category wire strings recognized in the sidecar.
const CATEGORY_FREE_TIER: &str = "free_tier";
const CATEGORY_GATED: &str = "gated";

/// Access classification, decided once at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateAccess {
    /// No gating; every user receives this template.
    FreeTier,
    /// Requires at least `required_tier`, and `required_feature` (when set)
    /// must be both permitted by the tier table and enabled for the user.
    Gated {
        required_tier: SubscriptionTier,
        required_feature: Option<FeatureType>,
    },
    /// A category string this service does not recognize. Carried through so
    /// the access decision can deny it with an explicit reason.
    Unknown { category: String },
}

/// Parsed template metadata with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMetadata {
    pub access: TemplateAccess,
    /// Free-form feature labels advertised by the template author.
    pub features: Vec<String>,
    pub version: String,
}

impl Default for TemplateMetadata {
    fn default() -> Self {
        TemplateMetadata {
            access: TemplateAccess::FreeTier,
            features: Vec::new(),
            version: DEFAULT_TEMPLATE_VERSION.to_string(),
        }
    }
}

/// An admin-owned template eligible for copying into user workspaces.
#[derive(Debug, Clone)]
pub struct Template {
    pub id: EntityId,
    pub name: String,
    /// Opaque workflow payload, copied verbatim.
    pub data: serde_json::Value,
    /// Raw description, sidecar included.
    pub description: Option<String>,
    pub folder_name: Option<String>,
    pub updated_at: Option<Timestamp>,
    pub meta: TemplateMetadata,
}

/// Wire shape of the description sidecar. Unknown fields are ignored.
#[derive(Debug, Deserialize, Serialize)]
struct DescriptionSidecar {
    user_description: Option<String>,
    template_metadata: Option<SidecarMetadata>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct SidecarMetadata {
    category: Option<String>,
    required_tier: Option<String>,
    required_feature: Option<String>,
    #[serde(default)]
    features: Vec<String>,
    version: Option<String>,
}

/// Parse the metadata sidecar out of a raw description.
///
/// Absent description, plain text, malformed JSON, or JSON without a
/// `template_metadata` key all yield [`TemplateMetadata::default`].
pub fn parse_description_metadata(description: Option<&str>) -> TemplateMetadata {
    let Some(raw) = description else {
        return TemplateMetadata::default();
    };

    let Ok(sidecar) = serde_json::from_str::<DescriptionSidecar>(raw) else {
        return TemplateMetadata::default();
    };
    let Some(meta) = sidecar.template_metadata else {
        return TemplateMetadata::default();
    };

    let access = match meta.category.as_deref() {
        None | Some(CATEGORY_FREE_TIER) => TemplateAccess::FreeTier,
        Some(CATEGORY_GATED) => TemplateAccess::Gated {
            required_tier: meta
                .required_tier
                .as_deref()
                .map(SubscriptionTier::from_external)
                .unwrap_or(SubscriptionTier::Starter),
            required_feature: meta
                .required_feature
                .as_deref()
                .and_then(FeatureType::from_external),
        },
        Some(other) => TemplateAccess::Unknown {
            category: other.to_string(),
        },
    };

    TemplateMetadata {
        access,
        features: meta.features,
        version: meta
            .version
            .unwrap_or_else(|| DEFAULT_TEMPLATE_VERSION.to_string()),
    }
}

/// Strip the sidecar and return only the user-facing description text.
///
/// Plain-text descriptions pass through unchanged; structured descriptions
/// without a `user_description` key also pass through unchanged.
pub fn clean_description(description: Option<&str>) -> String {
    let Some(raw) = description else {
        return String::new();
    };

    match serde_json::from_str::<DescriptionSidecar>(raw) {
        Ok(DescriptionSidecar {
            user_description: Some(text),
            ..
        }) => text,
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gated_description() -> String {
        serde_json::json!({
            "user_description": "Keyword research starter flow",
            "template_metadata": {
                "category": "gated",
                "required_tier": "business",
                "required_feature": "seo",
                "features": ["keyword_research"],
                "version": "1.1.0"
            }
        })
        .to_string()
    }

    #[test]
    fn test_parse_gated_sidecar() {
        let meta = parse_description_metadata(Some(&gated_description()));
        assert_eq!(
            meta.access,
            TemplateAccess::Gated {
                required_tier: SubscriptionTier::Business,
                required_feature: Some(FeatureType::Seo),
            }
        );
        assert_eq!(meta.features, vec!["keyword_research".to_string()]);
        assert_eq!(meta.version, "1.1.0");
    }

    #[test]
    fn test_missing_description_yields_defaults() {
        let meta = parse_description_metadata(None);
        assert_eq!(meta, TemplateMetadata::default());
        assert_eq!(meta.version, DEFAULT_TEMPLATE_VERSION);
    }

    #[test]
    fn test_plain_text_description_yields_defaults() {
        let meta = parse_description_metadata(Some("Just a helpful flow."));
        assert_eq!(meta.access, TemplateAccess::FreeTier);
        assert_eq!(meta.version, "1.0.0");
    }

    #[test]
    fn test_malformed_json_never_fails() {
        let meta = parse_description_metadata(Some("{\"template_metadata\": [broken"));
        assert_eq!(meta, TemplateMetadata::default());
    }

    #[test]
    fn test_json_without_metadata_key_yields_defaults() {
        let meta =
            parse_description_metadata(Some("{\"user_description\": \"hello\"}"));
        assert_eq!(meta, TemplateMetadata::default());
    }

    #[test]
    fn test_gated_without_tier_defaults_to_lowest() {
        let raw = serde_json::json!({
            "template_metadata": { "category": "gated" }
        })
        .to_string();
        let meta = parse_description_metadata(Some(&raw));
        assert_eq!(
            meta.access,
            TemplateAccess::Gated {
                required_tier: SubscriptionTier::Starter,
                required_feature: None,
            }
        );
    }

    #[test]
    fn test_unknown_category_is_carried_through() {
        let raw = serde_json::json!({
            "template_metadata": { "category": "beta_flows" }
        })
        .to_string();
        let meta = parse_description_metadata(Some(&raw));
        assert_eq!(
            meta.access,
            TemplateAccess::Unknown {
                category: "beta_flows".to_string()
            }
        );
    }

    #[test]
    fn test_clean_description_extracts_user_text() {
        assert_eq!(
            clean_description(Some(&gated_description())),
            "Keyword research starter flow"
        );
    }

    #[test]
    fn test_clean_description_passes_plain_text_through() {
        assert_eq!(clean_description(Some("Just text.")), "Just text.");
        assert_eq!(clean_description(None), "");
    }
}
