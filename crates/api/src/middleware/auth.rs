//! Service-to-service authentication extractor.
//!
//! Callers present a shared-secret bearer token in the `Authorization`
//! header. An unconfigured secret is a disabled-auth condition: it is
//! logged loudly and requests are rejected unless the explicit development
//! mode flag is set.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use flowsync_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Proof that the caller presented a valid service token.
///
/// Use this as an extractor parameter in any handler that requires
/// service authentication:
///
/// ```ignore
/// async fn my_handler(_auth: ServiceAuth) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ServiceAuth;

impl FromRequestParts<AppState> for ServiceAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok());

        if verify_bearer(
            header,
            state.config.service_token.as_deref(),
            state.config.dev_mode,
        ) {
            Ok(ServiceAuth)
        } else {
            Err(AppError::Core(CoreError::Unauthorized(
                "Invalid or missing service token".into(),
            )))
        }
    }
}

/// Check an `Authorization` header value against the configured secret.
pub fn verify_bearer(header: Option<&str>, expected: Option<&str>, dev_mode: bool) -> bool {
    let Some(expected) = expected else {
        tracing::error!("SERVICE_TOKEN not configured - service authentication is disabled");
        return dev_mode;
    };

    let Some(header) = header else {
        tracing::warn!("No authorization header provided");
        return false;
    };

    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => {
            let valid = token == expected;
            if !valid {
                tracing::warn!("Invalid service token provided");
            }
            valid
        }
        _ => {
            tracing::warn!("Invalid authorization header format");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bearer_token_is_accepted() {
        assert!(verify_bearer(Some("Bearer sekrit"), Some("sekrit"), false));
        assert!(verify_bearer(Some("bearer sekrit"), Some("sekrit"), false));
    }

    #[test]
    fn test_wrong_token_is_rejected() {
        assert!(!verify_bearer(Some("Bearer nope"), Some("sekrit"), false));
    }

    #[test]
    fn test_missing_header_is_rejected() {
        assert!(!verify_bearer(None, Some("sekrit"), false));
    }

    #[test]
    fn test_malformed_header_is_rejected() {
        assert!(!verify_bearer(Some("sekrit"), Some("sekrit"), false));
        assert!(!verify_bearer(Some("Basic sekrit"), Some("sekrit"), false));
        assert!(!verify_bearer(Some("Bearer a b"), Some("sekrit"), false));
    }

    #[test]
    fn test_unconfigured_secret_rejects_outside_dev_mode() {
        assert!(!verify_bearer(Some("Bearer anything"), None, false));
        // Development mode explicitly permits requests without a secret.
        assert!(verify_bearer(Some("Bearer anything"), None, true));
        assert!(verify_bearer(None, None, true));
    }
}
