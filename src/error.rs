// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::governor::GovernorError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError(String),
    ConfirmationError {
        message: String,
        expected_phrase: Option<String>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 429 Too Many Requests
    RateLimited {
        window: String,
        observed: u64,
        limit: u32,
    },

    // 500 Internal Server Error
    InternalServerError {
        message: String,
        action_id: Option<Uuid>,
    },

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::ConfirmationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::ValidationError(msg) => msg.clone(),
            ApiError::ConfirmationError { message, .. } => message.clone(),
            ApiError::Unauthorized(msg) => msg.clone(),
            ApiError::Forbidden(msg) => msg.clone(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::RateLimited { window, observed, limit } => format!(
                "rate limit exceeded: {}/{} real resets in the last {}",
                observed, limit, window
            ),
            ApiError::InternalServerError { message, .. } => message.clone(),
            ApiError::ServiceUnavailable(msg) => msg.clone(),
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::ConfirmationError { .. } => "CONFIRMATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::RateLimited { .. } => "RATE_LIMITED",
            ApiError::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code(),
        });

        match self {
            // The UI shows the operator exactly what to type.
            ApiError::ConfirmationError { expected_phrase: Some(phrase), .. } => {
                body["expected_confirmation"] = json!(phrase);
            }
            // Self-explanatory throttling: the exceeded window and counts.
            ApiError::RateLimited { window, observed, limit } => {
                body["window"] = json!(window);
                body["observed"] = json!(observed);
                body["limit"] = json!(limit);
            }
            // The audit trail stays discoverable even on error responses.
            ApiError::InternalServerError { action_id: Some(id), .. } => {
                body["action_id"] = json!(id);
            }
            _ => {}
        }

        body
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::InternalServerError { message: message.into(), action_id: None }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<GovernorError> for ApiError {
    fn from(err: GovernorError) -> Self {
        match err {
            GovernorError::Validation(msg) => ApiError::ValidationError(msg),
            GovernorError::Confirmation { message, expected_phrase } => {
                ApiError::ConfirmationError { message, expected_phrase }
            }
            GovernorError::RateLimited { window, observed, limit } => {
                ApiError::RateLimited { window, observed, limit }
            }
            GovernorError::TargetNotFound(target) => {
                ApiError::not_found(format!("unknown target: {}", target))
            }
            GovernorError::Internal { message, action_id } => {
                // Log the real error but keep the client message generic.
                tracing::error!("governor internal error: {}", message);
                ApiError::InternalServerError {
                    message: "an error occurred while processing the reset".to_string(),
                    action_id,
                }
            }
        }
    }
}

impl From<crate::governor::StoreError> for ApiError {
    fn from(err: crate::governor::StoreError) -> Self {
        match err {
            crate::governor::StoreError::NotFound(msg) => ApiError::not_found(msg),
            crate::governor::StoreError::Unavailable(msg) => {
                tracing::error!("store unavailable: {}", msg);
                ApiError::service_unavailable("database temporarily unavailable")
            }
            crate::governor::StoreError::Query(msg) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("store query error: {}", msg);
                ApiError::internal("an error occurred while processing your request")
            }
        }
    }
}

impl From<crate::database::manager::DatabaseError> for ApiError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        tracing::error!("database error: {}", err);
        ApiError::service_unavailable("database temporarily unavailable")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_body_carries_window_counts() {
        let err = ApiError::RateLimited { window: "hour".to_string(), observed: 3, limit: 3 };
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        let body = err.to_json();
        assert_eq!(body["window"], "hour");
        assert_eq!(body["observed"], 3);
        assert_eq!(body["limit"], 3);
    }

    #[test]
    fn internal_error_echoes_action_id() {
        let id = Uuid::new_v4();
        let err: ApiError = GovernorError::internal("boom", Some(id)).into();
        assert_eq!(err.to_json()["action_id"], json!(id));
    }
}
