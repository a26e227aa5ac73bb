// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// Every failure in the bearer gate and the identity resolver is terminal for
/// the request and maps onto exactly one of these variants. `VersionConflict`
/// is the only variant designed for client-side retry: it carries both the
/// expected and the supplied version so the caller can re-fetch and resubmit.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    MissingTargetClient,

    // 401 Unauthorized
    MalformedCredentials(String),
    Unauthorized(String),
    InvalidCredentials,
    InactiveClient,
    InactiveService,

    // 403 Forbidden
    WrongSecret,
    IdentityMismatch,
    NotAuthorized(String),

    // 404 Not Found
    NotFound(String),
    TargetClientNotFound,

    // 409 Conflict
    VersionConflict { expected: i32, supplied: i64 },
    ConcurrentUpdate,

    // 500 Internal Server Error
    ServerMisconfigured(String),
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingTargetClient => StatusCode::BAD_REQUEST,
            ApiError::MalformedCredentials(_) => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::InactiveClient => StatusCode::UNAUTHORIZED,
            ApiError::InactiveService => StatusCode::UNAUTHORIZED,
            ApiError::WrongSecret => StatusCode::FORBIDDEN,
            ApiError::IdentityMismatch => StatusCode::FORBIDDEN,
            ApiError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TargetClientNotFound => StatusCode::NOT_FOUND,
            ApiError::VersionConflict { .. } => StatusCode::CONFLICT,
            ApiError::ConcurrentUpdate => StatusCode::CONFLICT,
            ApiError::ServerMisconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-safe error message
    pub fn detail(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::MissingTargetClient => {
                "X-Client-ID header is required for service access".to_string()
            }
            ApiError::MalformedCredentials(msg) => msg.clone(),
            ApiError::Unauthorized(msg) => msg.clone(),
            ApiError::InvalidCredentials => "Invalid API Key".to_string(),
            ApiError::InactiveClient => "Client is inactive".to_string(),
            ApiError::InactiveService => "Service is inactive".to_string(),
            ApiError::WrongSecret => "Invalid API key".to_string(),
            ApiError::IdentityMismatch => {
                "API Key does not match provided Client ID".to_string()
            }
            ApiError::NotAuthorized(msg) => msg.clone(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::TargetClientNotFound => "Target Client not found".to_string(),
            ApiError::VersionConflict { expected, supplied } => {
                format!("Version conflict: expected {}, got {}", expected, supplied)
            }
            ApiError::ConcurrentUpdate => {
                "Version conflict: entity was modified concurrently".to_string()
            }
            ApiError::ServerMisconfigured(msg) => msg.clone(),
            ApiError::Internal(msg) => msg.clone(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn malformed_credentials(message: impl Into<String>) -> Self {
        ApiError::MalformedCredentials(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_authorized(message: impl Into<String>) -> Self {
        ApiError::NotAuthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::not_found("Record not found"),
            other => {
                // Log the real error but return a generic message
                tracing::error!("database error: {}", other);
                ApiError::internal("An error occurred while processing your request")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.detail())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = json!({ "detail": self.detail() });
        (status, Json(body)).into_response()
    }
}
