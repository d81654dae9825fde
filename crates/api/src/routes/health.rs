use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
    version: &'static str,
    account_store_healthy: bool,
    workspace_store_healthy: bool,
}

/// GET /health -- returns service health and reachability of both stores.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let account_store_healthy = flowsync_db::health_check(&state.account_pool).await.is_ok();
    let workspace_store_healthy = flowsync_db::health_check(&state.workspace_pool)
        .await
        .is_ok();

    let status = if account_store_healthy && workspace_store_healthy {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        service: "flowsync",
        status,
        version: env!("CARGO_PKG_VERSION"),
        account_store_healthy,
        workspace_store_healthy,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
