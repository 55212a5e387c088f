use axum::{Json, extract::State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, Capability};
use crate::extractors::json::AppJson;
use crate::models::auth::{LoginRequest, LoginResponse, ProfileResponse, validate_login_request};
use crate::state::AppState;
use crate::utils::hash::{self, HashError};
use crate::utils::jwt;

/// Handle user login.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Exchange credentials for a bearer token",
    description = "Returns a signed token carrying the user's id, username and role. \
        Unknown usernames and wrong passwords produce the same 401 response.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid credentials (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let username = payload.username.trim();

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(&state.db)
        .await?;

    let Some(user) = user else {
        hash::verify_dummy(&payload.password);
        return Err(AppError::InvalidCredentials);
    };

    let is_valid = match hash::verify_password(&payload.password, &user.password) {
        Ok(valid) => valid,
        Err(HashError::Malformed(e)) => {
            tracing::warn!(user_id = user.id, error = %e, "Stored password hash is malformed");
            false
        }
        Err(e) => return Err(AppError::Internal(format!("Password verify error: {}", e))),
    };

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    if hash::needs_rehash(&user.password) {
        upgrade_password_hash(&state.db, &user, &payload.password).await;
    }

    let token = jwt::sign(
        user.id,
        &user.username,
        user.role,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_secs,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        role: user.role,
    }))
}

/// Replace a legacy password hash with Argon2 after a successful login.
///
/// Failures are logged; the login itself has already succeeded.
async fn upgrade_password_hash(db: &DatabaseConnection, user: &user::Model, password: &str) {
    let new_hash = match hash::hash_password(password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::warn!(user_id = user.id, error = %e, "Failed to rehash legacy password");
            return;
        }
    };

    let mut active: user::ActiveModel = user.clone().into();
    active.password = Set(new_hash);
    match active.update(db).await {
        Ok(_) => tracing::info!(user_id = user.id, "Upgraded legacy password hash to Argon2"),
        Err(e) => {
            tracing::warn!(user_id = user.id, error = %e, "Failed to store upgraded password hash")
        }
    }
}

/// Return the current authenticated user's account.
#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Auth",
    operation_id = "getProfile",
    summary = "Get the caller's own account",
    responses(
        (status = 200, description = "Caller's account", body = ProfileResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Account no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, AppError> {
    auth_user.require(Capability::ViewContent)?;

    let user = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(user.into()))
}
