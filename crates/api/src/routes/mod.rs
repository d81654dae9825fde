pub mod health;
pub mod sync;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sync/{user_id}                                sync templates (POST)
/// /sync/{user_id}/status                         sync status (GET)
/// /sync/{user_id}/check-access/{template_id}     access check (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/sync", sync::router())
}
