//! Bearer gate: a single static shared-secret check applied to every
//! protected route, independent of per-client identity. Proves the caller
//! holds the platform-wide secret before the finer-grained principal
//! resolution runs. On success the request simply proceeds; no entity is
//! resolved here.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn bearer_gate(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    verify_bearer(authorization, state.config.security.api_secret.as_deref())?;

    Ok(next.run(request).await)
}

/// Validate an `Authorization: Bearer <token>` header against the configured
/// shared secret.
///
/// - absent or malformed header (not exactly two tokens, scheme not
///   case-insensitively "Bearer") -> 401
/// - no secret configured -> 500, surfaced as a server fault
/// - wrong token -> 403
fn verify_bearer(authorization: Option<&str>, secret: Option<&str>) -> Result<(), ApiError> {
    let header = authorization
        .ok_or_else(|| ApiError::malformed_credentials("Missing authorization header"))?;

    let parts: Vec<&str> = header.split_whitespace().collect();
    if parts.len() != 2 || !parts[0].eq_ignore_ascii_case("bearer") {
        return Err(ApiError::malformed_credentials(
            "Invalid authentication scheme. Expected 'Bearer <token>'",
        ));
    }

    let expected = secret.ok_or_else(|| {
        ApiError::ServerMisconfigured("API_SECRET_KEY not configured on server".to_string())
    })?;

    if parts[1] != expected {
        return Err(ApiError::WrongSecret);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    const SECRET: Option<&str> = Some("platform-secret");

    #[test]
    fn missing_header_is_unauthorized() {
        let err = verify_bearer(None, SECRET).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn malformed_headers_are_unauthorized() {
        for header in ["platform-secret", "Bearer", "Bearer a b", "Token platform-secret"] {
            let err = verify_bearer(Some(header), SECRET).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED, "header: {header}");
        }
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert!(verify_bearer(Some("bearer platform-secret"), SECRET).is_ok());
        assert!(verify_bearer(Some("BEARER platform-secret"), SECRET).is_ok());
    }

    #[test]
    fn wrong_token_is_forbidden() {
        let err = verify_bearer(Some("Bearer nope"), SECRET).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn unconfigured_secret_is_a_server_fault() {
        let err = verify_bearer(Some("Bearer anything"), None).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn correct_token_passes() {
        assert!(verify_bearer(Some("Bearer platform-secret"), SECRET).is_ok());
    }
}
