//! Account API handlers
//!
//! POST /auth/register — create account with the starting balance, return a token
//! POST /auth/login    — verify credentials, return a token

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use shared::error::{ApiError, ApiResult};
use shared::models::PublicUser;

use crate::state::AppState;
use crate::{auth, db};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub user: PublicUser,
}

fn validate_credentials(email: &str, password: &str) -> ApiResult<()> {
    if !email.contains('@') {
        return Err(ApiError::validation("A valid email is required"));
    }
    if password.len() < 8 {
        return Err(ApiError::validation(
            "Password must be at least 8 characters",
        ));
    }
    Ok(())
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<TokenResponse>> {
    validate_credentials(&req.email, &req.password)?;

    if db::users::find_by_email(&state.pool, &req.email)
        .await
        .map_err(ApiError::from)?
        .is_some()
    {
        return Err(ApiError::conflict("Email is already registered"));
    }

    let hash = auth::hash_password(&req.password)
        .map_err(|e| ApiError::internal(format!("Password hashing failed: {e}")))?;
    let user = db::users::create(&state.pool, &req.email, &hash)
        .await
        .map_err(ApiError::from)?;

    let access_token = auth::create_token(user.id, &user.email, &state.jwt_secret)
        .map_err(|e| ApiError::internal(format!("Token creation failed: {e}")))?;

    tracing::info!("New account registered: {}", user.email);
    Ok(Json(TokenResponse { access_token, user }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let Some(user) = db::users::find_by_email(&state.pool, &req.email)
        .await
        .map_err(ApiError::from)?
    else {
        return Err(ApiError::Unauthorized);
    };

    if !auth::verify_password(&req.password, &user.password) {
        return Err(ApiError::Unauthorized);
    }

    let public = PublicUser::from(user);
    let access_token = auth::create_token(public.id, &public.email, &state.jwt_secret)
        .map_err(|e| ApiError::internal(format!("Token creation failed: {e}")))?;

    Ok(Json(TokenResponse {
        access_token,
        user: public,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_validation() {
        assert!(validate_credentials("a@b.c", "longenough").is_ok());
        assert!(validate_credentials("not-an-email", "longenough").is_err());
        assert!(validate_credentials("a@b.c", "short").is_err());
    }
}
