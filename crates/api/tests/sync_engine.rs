//! Integration tests for the sync orchestration engine.
//!
//! The engine is exercised against in-memory fake stores, so every
//! reconciliation path (create, idempotent re-run, force re-copy, skip,
//! denial, per-copy failure) is covered without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use uuid::Uuid;

use flowsync_api::engine::{
    EngineOptions, EntitlementDirectory, SyncEngine, TemplateCatalog, WorkspaceStore,
};
use flowsync_core::entitlement::UserEntitlement;
use flowsync_core::error::CoreError;
use flowsync_core::report::{SyncAction, SyncOutcome};
use flowsync_core::template::{Template, TemplateAccess, TemplateMetadata};
use flowsync_core::tier::{tier_limits, FeatureType, SubscriptionTier};
use flowsync_core::types::EntityId;
use flowsync_core::workspace::{CopiedFlow, WorkspaceUser};

const UPGRADE_URL: &str = "https://app.flowsync.example/pricing";
const FOLDER_NAME: &str = "Templates";

// ---------------------------------------------------------------------------
// Fake stores
// ---------------------------------------------------------------------------

struct FakeDirectory {
    users: HashMap<EntityId, UserEntitlement>,
}

#[async_trait]
impl EntitlementDirectory for FakeDirectory {
    async fn entitlement(&self, user_id: EntityId) -> Result<Option<UserEntitlement>, CoreError> {
        Ok(self.users.get(&user_id).cloned())
    }
}

struct FakeCatalog {
    templates: Vec<Template>,
}

#[async_trait]
impl TemplateCatalog for FakeCatalog {
    async fn list_templates(&self) -> Result<Vec<Template>, CoreError> {
        Ok(self.templates.clone())
    }
}

#[derive(Default)]
struct WorkspaceState {
    /// (id, owner, name, parent)
    folders: Vec<(EntityId, EntityId, String, Option<EntityId>)>,
    /// (owner, flow)
    flows: Vec<(EntityId, CopiedFlow)>,
}

struct FakeWorkspace {
    users: HashMap<String, WorkspaceUser>,
    state: Mutex<WorkspaceState>,
    /// Template name whose copy should fail, exercising the
    /// continue-on-copy-failure path.
    fail_copy_named: Option<String>,
    folder_creations: AtomicUsize,
}

impl FakeWorkspace {
    fn new(users: HashMap<String, WorkspaceUser>) -> Self {
        Self {
            users,
            state: Mutex::new(WorkspaceState::default()),
            fail_copy_named: None,
            folder_creations: AtomicUsize::new(0),
        }
    }

    fn with_user(handle: &str) -> (Self, WorkspaceUser) {
        let user = WorkspaceUser {
            id: Uuid::new_v4(),
            username: handle.to_string(),
            is_active: true,
        };
        let mut users = HashMap::new();
        users.insert(handle.to_string(), user.clone());
        (Self::new(users), user)
    }

    fn flow_count(&self) -> usize {
        self.state.lock().unwrap().flows.len()
    }

    fn insert_copy(&self, owner: EntityId, template: &Template) -> Result<EntityId, CoreError> {
        if self.fail_copy_named.as_deref() == Some(template.name.as_str()) {
            return Err(CoreError::Upstream("simulated copy failure".into()));
        }
        let id = Uuid::new_v4();
        self.state.lock().unwrap().flows.push((
            owner,
            CopiedFlow {
                id,
                name: template.name.clone(),
                folder_id: None,
                updated_at: None,
            },
        ));
        Ok(id)
    }
}

#[async_trait]
impl WorkspaceStore for FakeWorkspace {
    async fn find_user(&self, handle: &str) -> Result<Option<WorkspaceUser>, CoreError> {
        Ok(self.users.get(handle).cloned())
    }

    async fn get_or_create_folder(
        &self,
        owner: EntityId,
        name: &str,
        parent_id: Option<EntityId>,
    ) -> Result<(EntityId, bool), CoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some((id, ..)) = state
            .folders
            .iter()
            .find(|(_, o, n, p)| *o == owner && n == name && *p == parent_id)
        {
            return Ok((*id, false));
        }
        let id = Uuid::new_v4();
        state
            .folders
            .push((id, owner, name.to_string(), parent_id));
        self.folder_creations.fetch_add(1, Ordering::SeqCst);
        Ok((id, true))
    }

    async fn copy_exists(&self, owner: EntityId, template_name: &str) -> Result<bool, CoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .flows
            .iter()
            .any(|(o, f)| *o == owner && f.name == template_name))
    }

    async fn copy_template(
        &self,
        owner: EntityId,
        template: &Template,
        _folder_id: EntityId,
    ) -> Result<EntityId, CoreError> {
        self.insert_copy(owner, template)
    }

    async fn copy_template_if_absent(
        &self,
        owner: EntityId,
        template: &Template,
        _folder_id: EntityId,
    ) -> Result<Option<EntityId>, CoreError> {
        if self.copy_exists(owner, &template.name).await? {
            return Ok(None);
        }
        self.insert_copy(owner, template).map(Some)
    }

    async fn list_copies(&self, owner: EntityId) -> Result<Vec<CopiedFlow>, CoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .flows
            .iter()
            .filter(|(o, _)| *o == owner)
            .map(|(_, f)| f.clone())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn entitlement(
    user_id: EntityId,
    tier: SubscriptionTier,
    enabled: Vec<FeatureType>,
) -> UserEntitlement {
    UserEntitlement {
        user_id,
        email: "user@example.com".to_string(),
        tier,
        enabled_features: enabled,
        tier_limits: tier_limits(tier),
        is_active: true,
        tenant_id: None,
    }
}

fn template(name: &str, access: TemplateAccess) -> Template {
    Template {
        id: Uuid::new_v4(),
        name: name.to_string(),
        data: serde_json::json!({"nodes": []}),
        description: None,
        folder_name: Some("Shared".to_string()),
        updated_at: None,
        meta: TemplateMetadata {
            access,
            features: vec![],
            version: "1.0.0".to_string(),
        },
    }
}

fn free_template(name: &str) -> Template {
    template(name, TemplateAccess::FreeTier)
}

fn gated_template(
    name: &str,
    required_tier: SubscriptionTier,
    required_feature: Option<FeatureType>,
) -> Template {
    template(
        name,
        TemplateAccess::Gated {
            required_tier,
            required_feature,
        },
    )
}

struct Harness {
    engine: SyncEngine,
    workspace: Arc<FakeWorkspace>,
    user_id: EntityId,
}

fn build_harness(
    tier: SubscriptionTier,
    enabled: Vec<FeatureType>,
    templates: Vec<Template>,
    workspace_user_exists: bool,
    fail_copy_named: Option<&str>,
) -> Harness {
    let user_id = Uuid::new_v4();
    let ent = entitlement(user_id, tier, enabled);

    let mut workspace = if workspace_user_exists {
        FakeWorkspace::with_user(&ent.email).0
    } else {
        FakeWorkspace::new(HashMap::new())
    };
    workspace.fail_copy_named = fail_copy_named.map(str::to_string);
    let workspace = Arc::new(workspace);

    let directory = FakeDirectory {
        users: HashMap::from([(user_id, ent)]),
    };
    let catalog = FakeCatalog { templates };

    let engine = SyncEngine::new(
        Arc::new(directory),
        Arc::new(catalog),
        Arc::clone(&workspace) as Arc<dyn WorkspaceStore>,
        EngineOptions {
            user_folder_name: FOLDER_NAME.to_string(),
            upgrade_url: UPGRADE_URL.to_string(),
        },
    );

    Harness {
        engine,
        workspace,
        user_id,
    }
}

// ---------------------------------------------------------------------------
// Test: first sync creates accessible templates and denies gated ones
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_first_sync_creates_free_template_and_denies_gated_by_tier() {
    let h = build_harness(
        SubscriptionTier::Starter,
        vec![],
        vec![
            free_template("T1"),
            gated_template("T2", SubscriptionTier::Business, Some(FeatureType::Seo)),
        ],
        true,
        None,
    );

    let report = h.engine.sync_user(h.user_id, false).await.unwrap();

    assert_eq!(report.status, SyncOutcome::Success);
    assert_eq!(report.flows_created.len(), 1);
    assert_eq!(report.flows_created[0].name, "T1");
    assert_eq!(report.flows_created[0].action, SyncAction::Created);
    assert_eq!(report.flows_created[0].folder, FOLDER_NAME);
    assert!(report.flows_created[0].flow_id.is_some());

    assert_eq!(report.flows_up_to_date, 0);
    assert_eq!(report.flows_denied.len(), 1);
    let denied = &report.flows_denied[0];
    assert_eq!(denied.name, "T2");
    assert_eq!(denied.action, SyncAction::Denied);
    assert!(denied.flow_id.is_none());
    assert!(denied
        .denial_reason
        .as_deref()
        .unwrap()
        .contains("Requires business tier or higher"));

    assert_eq!(report.total_templates_available, 2);
    assert_eq!(report.total_templates_accessible, 1);
    assert_eq!(report.total_templates_synced, 1);
    assert_eq!(report.folders_created, vec![FOLDER_NAME.to_string()]);
}

// ---------------------------------------------------------------------------
// Test: second sync without force is idempotent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_second_sync_without_force_creates_nothing() {
    let h = build_harness(
        SubscriptionTier::Starter,
        vec![],
        vec![free_template("T1")],
        true,
        None,
    );

    let first = h.engine.sync_user(h.user_id, false).await.unwrap();
    assert_eq!(first.flows_created.len(), 1);

    let second = h.engine.sync_user(h.user_id, false).await.unwrap();
    assert_eq!(second.flows_created.len(), 0);
    assert_eq!(second.flows_updated.len(), 0);
    // Every accessible template counts as up-to-date on the second pass.
    assert_eq!(second.flows_up_to_date, second.total_templates_accessible);
    assert_eq!(second.flows_up_to_date, 1);
    assert!(second.folders_created.is_empty());

    assert_eq!(h.workspace.flow_count(), 1);
    assert_eq!(h.workspace.folder_creations.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Test: force sync re-copies as "updated" and accumulates rows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_force_sync_recopies_existing_template_as_updated() {
    let h = build_harness(
        SubscriptionTier::Starter,
        vec![],
        vec![free_template("T1")],
        true,
        None,
    );

    h.engine.sync_user(h.user_id, false).await.unwrap();
    let forced = h.engine.sync_user(h.user_id, true).await.unwrap();

    assert_eq!(forced.flows_created.len(), 0);
    assert_eq!(forced.flows_updated.len(), 1);
    assert_eq!(forced.flows_updated[0].action, SyncAction::Updated);
    assert_eq!(forced.flows_up_to_date, 0);

    // "Updated" inserts a new row rather than replacing the old copy.
    assert_eq!(h.workspace.flow_count(), 2);
}

// ---------------------------------------------------------------------------
// Test: missing workspace account yields a skipped report, not an error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_missing_workspace_account_yields_skipped_report() {
    let h = build_harness(
        SubscriptionTier::Business,
        vec![FeatureType::Seo],
        vec![free_template("T1")],
        false,
        None,
    );

    let report = h.engine.sync_user(h.user_id, false).await.unwrap();

    assert_eq!(report.status, SyncOutcome::Skipped);
    assert_eq!(report.total_templates_available, 0);
    assert_eq!(report.total_templates_accessible, 0);
    assert_eq!(report.total_templates_synced, 0);
    assert!(report.flows_created.is_empty());
    assert!(report.message.as_deref().unwrap().contains("workspace"));

    // Nothing was written.
    assert_eq!(h.workspace.flow_count(), 0);
    assert_eq!(h.workspace.folder_creations.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Test: user unknown to the account store aborts with NotFound
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_unknown_account_user_aborts_with_not_found() {
    let h = build_harness(
        SubscriptionTier::Starter,
        vec![],
        vec![free_template("T1")],
        true,
        None,
    );

    let err = h.engine.sync_user(Uuid::new_v4(), false).await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "user", .. });
}

// ---------------------------------------------------------------------------
// Test: one failing copy does not abort the batch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_single_copy_failure_does_not_abort_batch() {
    let h = build_harness(
        SubscriptionTier::Starter,
        vec![],
        vec![free_template("Good"), free_template("Broken")],
        true,
        Some("Broken"),
    );

    let report = h.engine.sync_user(h.user_id, false).await.unwrap();

    // The failing template is omitted; the rest of the batch proceeds and
    // the overall status stays "success" (known masking behavior).
    assert_eq!(report.status, SyncOutcome::Success);
    assert_eq!(report.flows_created.len(), 1);
    assert_eq!(report.flows_created[0].name, "Good");
    assert_eq!(report.total_templates_accessible, 2);
    assert_eq!(report.total_templates_synced, 1);
}

// ---------------------------------------------------------------------------
// Test: gated template is granted when tier and enablement both pass
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_gated_template_synced_when_tier_and_feature_allow() {
    let h = build_harness(
        SubscriptionTier::Business,
        vec![FeatureType::Seo],
        vec![gated_template(
            "T2",
            SubscriptionTier::Business,
            Some(FeatureType::Seo),
        )],
        true,
        None,
    );

    let report = h.engine.sync_user(h.user_id, false).await.unwrap();
    assert_eq!(report.flows_created.len(), 1);
    assert!(report.flows_denied.is_empty());
}

// ---------------------------------------------------------------------------
// Test: sync status recomputes counts and upgrade opportunities, no writes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_sync_status_reports_counts_and_upgrade_opportunities() {
    let h = build_harness(
        SubscriptionTier::Starter,
        vec![FeatureType::PaidAds],
        vec![
            free_template("Free"),
            // Tier denial: upgrade opportunity.
            gated_template("NeedsBusiness", SubscriptionTier::Business, None),
            // Feature denial at an affordable tier: not an upgrade opportunity.
            gated_template("NeedsPaidAds", SubscriptionTier::Starter, Some(FeatureType::PaidAds)),
        ],
        true,
        None,
    );

    let snapshot = h.engine.sync_status(h.user_id).await.unwrap();

    assert_eq!(snapshot.accessible_templates, 1);
    assert_eq!(snapshot.denied_templates, 2);
    assert_eq!(snapshot.total_flows, 0);
    assert_eq!(snapshot.upgrade_opportunities.len(), 1);
    assert_eq!(
        snapshot.upgrade_opportunities[0].template_name,
        "NeedsBusiness"
    );
    assert_eq!(
        snapshot.upgrade_opportunities[0].required_tier,
        SubscriptionTier::Business
    );

    // Status is read-only.
    assert_eq!(h.workspace.flow_count(), 0);
    assert_eq!(h.workspace.folder_creations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_sync_status_counts_existing_flows() {
    let h = build_harness(
        SubscriptionTier::Starter,
        vec![],
        vec![free_template("T1")],
        true,
        None,
    );

    h.engine.sync_user(h.user_id, false).await.unwrap();
    let snapshot = h.engine.sync_status(h.user_id).await.unwrap();
    assert_eq!(snapshot.total_flows, 1);
}

// ---------------------------------------------------------------------------
// Test: single-template access verdicts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_check_access_grants_free_template_without_upgrade_url() {
    let t1 = free_template("T1");
    let template_id = t1.id;
    let h = build_harness(SubscriptionTier::Starter, vec![], vec![t1], true, None);

    let verdict = h.engine.check_access(h.user_id, template_id).await.unwrap();
    assert!(verdict.has_access);
    assert_eq!(verdict.template_name, "T1");
    assert!(verdict.reason.is_none());
    assert!(verdict.upgrade_url.is_none());
}

#[tokio::test]
async fn test_check_access_denial_includes_requirements_and_upgrade_url() {
    let t2 = gated_template("T2", SubscriptionTier::Business, Some(FeatureType::Seo));
    let template_id = t2.id;
    let h = build_harness(SubscriptionTier::Starter, vec![], vec![t2], true, None);

    let verdict = h.engine.check_access(h.user_id, template_id).await.unwrap();
    assert!(!verdict.has_access);
    assert_eq!(verdict.required_tier, Some(SubscriptionTier::Business));
    assert_eq!(verdict.required_feature, Some(FeatureType::Seo));
    assert_eq!(verdict.upgrade_url.as_deref(), Some(UPGRADE_URL));
    assert!(verdict.reason.unwrap().contains("Requires business tier"));
}

#[tokio::test]
async fn test_check_access_unknown_template_yields_not_found_verdict() {
    let h = build_harness(
        SubscriptionTier::Starter,
        vec![],
        vec![free_template("T1")],
        true,
        None,
    );

    let verdict = h
        .engine
        .check_access(h.user_id, Uuid::new_v4())
        .await
        .unwrap();
    assert!(!verdict.has_access);
    assert_eq!(verdict.reason.as_deref(), Some("Template not found"));
    assert!(verdict.upgrade_url.is_none());
}

// ---------------------------------------------------------------------------
// Test: unknown category templates are denied with an explicit reason
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_unknown_category_template_is_denied_not_fatal() {
    let h = build_harness(
        SubscriptionTier::Enterprise,
        vec![FeatureType::Seo],
        vec![template(
            "Odd",
            TemplateAccess::Unknown {
                category: "beta_flows".to_string(),
            },
        )],
        true,
        None,
    );

    let report = h.engine.sync_user(h.user_id, false).await.unwrap();
    assert_eq!(report.status, SyncOutcome::Success);
    assert_eq!(report.flows_denied.len(), 1);
    assert_eq!(
        report.flows_denied[0].denial_reason.as_deref(),
        Some("Unknown template category: beta_flows")
    );
}
