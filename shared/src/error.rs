//! Unified error type for the locker shop service
//!
//! Business-rule and not-found failures propagate to the caller as distinct
//! variants so the client can render a specific message; database errors are
//! logged server-side and collapse to an opaque 500.

use http::StatusCode;
use serde_json::json;
use thiserror::Error;

/// Unified API error
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing required input (400)
    #[error("{message}")]
    Validation { message: String },

    /// Authentication required (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Invalid or expired token (401)
    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    /// Operation not permitted, e.g. insufficient balance (403)
    #[error("Permission denied: {message}")]
    Forbidden { message: String },

    /// Unknown user/cosmetic/bundle id (404)
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Resource already exists or is already owned (409)
    #[error("{message}")]
    Conflict { message: String },

    /// Business rule violation (422)
    #[error("{message}")]
    BusinessRule { message: String },

    /// Database error (500)
    #[error("Database error: {message}")]
    Database { message: String },

    /// Internal server error (500)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRule {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::InvalidToken { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::BusinessRule { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "E0002",
            Self::Unauthorized => "E3001",
            Self::InvalidToken { .. } => "E3002",
            Self::Forbidden { .. } => "E2001",
            Self::NotFound { .. } => "E0003",
            Self::Conflict { .. } => "E0004",
            Self::BusinessRule { .. } => "E0005",
            Self::Database { .. } => "E9002",
            Self::Internal { .. } => "E9001",
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        // Never leak internal detail to clients
        let message = match &self {
            Self::Database { .. } | Self::Internal { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        };
        let body = json!({ "code": self.code(), "message": message });
        (self.status_code(), axum::Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::not_found("Cosmetic").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::conflict("owned").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::business_rule("refund via bundle").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::forbidden("insufficient balance").status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn not_found_message_names_resource() {
        assert_eq!(ApiError::not_found("Bundle").to_string(), "Bundle not found");
    }
}
