use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use flowsync_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and implements [`IntoResponse`] to produce consistent
/// JSON error responses. All sqlx errors are converted to
/// [`CoreError::Upstream`] at the store adapters, so no database variant
/// exists at this layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `flowsync_core`.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                // Either backing store is unreachable. Distinct from plain
                // internal errors so callers can tell "our bug" from
                // "upstream outage". Details are logged, never returned.
                CoreError::Upstream(msg) => {
                    tracing::error!(error = %msg, "Upstream store error");
                    (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        "An upstream data store is unavailable".to_string(),
                    )
                }
            },
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = AppError::Core(CoreError::NotFound {
            entity: "user",
            id: Uuid::new_v4(),
        });
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        let err = AppError::Core(CoreError::Unauthorized("bad token".into()));
        assert_eq!(status_of(err), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_upstream_maps_to_502_without_leaking_details() {
        let err = AppError::Core(CoreError::Upstream(
            "connection refused (127.0.0.1:5432)".into(),
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
