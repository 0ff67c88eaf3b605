//! Unified service-layer error type for the shop server
//!
//! `ServiceError` bridges the gap between DB/infra errors (`sqlx::Error`,
//! `reqwest::Error`, `BoxError`) and the API-layer `ApiError`. It enables `?`
//! propagation without manual `.map_err(...)` boilerplate at every call site.

use axum::response::IntoResponse;
use shared::error::ApiError;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error — only two variants, keeps things simple.
///
/// - `Db`: database/infrastructure errors (auto-logged, mapped to 500)
/// - `Api`: business-rule errors (transparent pass-through to the client)
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Database or infrastructure error (sqlx, reqwest, serde, etc.)
    #[error("database error: {0}")]
    Db(BoxError),
    /// Business-rule error (already an ApiError with the correct status)
    #[error(transparent)]
    Api(ApiError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<ApiError> for ServiceError {
    fn from(e: ApiError) -> Self {
        ServiceError::Api(e)
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Api(api_err) => api_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                ApiError::database(db_err.to_string())
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let api_error: ApiError = self.into();
        api_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;
