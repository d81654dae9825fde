//! Route definitions for template sync operations.
//!
//! All endpoints require service authentication via the `ServiceAuth` extractor.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sync;
use crate::state::AppState;

/// Sync routes mounted at `/sync`.
///
/// ```text
/// POST /{user_id}                              -> sync_user
/// GET  /{user_id}/status                       -> get_sync_status
/// POST /{user_id}/check-access/{template_id}   -> check_template_access
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", post(sync::sync_user))
        .route("/{user_id}/status", get(sync::get_sync_status))
        .route(
            "/{user_id}/check-access/{template_id}",
            post(sync::check_template_access),
        )
}
