//! Handlers for template sync, sync status, and single-template access checks.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::auth::ServiceAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query params for the sync endpoint.
#[derive(Debug, Deserialize)]
pub struct SyncQuery {
    /// Re-copy accessible templates even when a copy already exists.
    #[serde(default)]
    pub force_sync: bool,
}

/// POST /api/v1/sync/{user_id}?force_sync=false
///
/// Sync the accessible subset of the template catalog into the user's
/// workspace. Returns a skipped report (not an error) when the user has no
/// workspace account yet.
pub async fn sync_user(
    _auth: ServiceAuth,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<SyncQuery>,
) -> AppResult<impl IntoResponse> {
    tracing::info!(%user_id, force_sync = params.force_sync, "Sync request received");
    let report = state.engine.sync_user(user_id, params.force_sync).await?;
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/sync/{user_id}/status
///
/// Read-only view of the user's current access: accessible/denied counts,
/// current flow count, and upgrade opportunities. Performs no writes.
pub async fn get_sync_status(
    _auth: ServiceAuth,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state.engine.sync_status(user_id).await?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// POST /api/v1/sync/{user_id}/check-access/{template_id}
///
/// Access verdict for a single template. An unknown template id yields a
/// not-found verdict rather than a 404.
pub async fn check_template_access(
    _auth: ServiceAuth,
    State(state): State<AppState>,
    Path((user_id, template_id)): Path<(Uuid, Uuid)>,
) -> AppResult<impl IntoResponse> {
    let verdict = state.engine.check_access(user_id, template_id).await?;
    Ok(Json(DataResponse { data: verdict }))
}
