use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, Capability};
use crate::extractors::json::AppJson;
use crate::models::shared::MessageResponse;
use crate::models::user::*;
use crate::state::AppState;
use crate::utils::cache::SETLISTS_KEY;
use crate::utils::hash;

fn username_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::UsernameTaken,
        _ => AppError::from(err),
    }
}

fn hash_password(password: &str) -> Result<String, AppError> {
    hash::hash_password(password).map_err(|e| AppError::Internal(format!("Hash error: {}", e)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List all user accounts",
    description = "Admin only. Password hashes are never returned.",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    auth_user.require(Capability::ManageUsers)?;

    let users = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    operation_id = "createUser",
    summary = "Create a user account",
    description = "Admin only. The password is stored as an Argon2 hash.",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = MessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Username already exists (USERNAME_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(username = %payload.username, role = %payload.role))]
pub async fn create_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Capability::ManageUsers)?;
    validate_create_user(&payload)?;

    let password_hash = hash_password(&payload.password)?;

    let model = user::ActiveModel {
        username: Set(payload.username.trim().to_string()),
        password: Set(password_hash),
        role: Set(payload.role),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(username_conflict)?;

    tracing::info!(user_id = model.id, "User created");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created", model.id)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    operation_id = "updateUser",
    summary = "Update a user account",
    description = "Admin only. Replaces username and role; the password changes only when a \
        non-empty one is supplied. Tokens already issued keep their old role until they expire.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = MessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Username already exists (USERNAME_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = id))]
pub async fn update_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    auth_user.require(Capability::ManageUsers)?;
    validate_update_user(&payload)?;

    let existing = user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let mut active: user::ActiveModel = existing.into();
    active.username = Set(payload.username.trim().to_string());
    active.role = Set(payload.role);
    if let Some(password) = payload.password.as_deref().filter(|p| !p.is_empty()) {
        active.password = Set(hash_password(password)?);
    }
    active.update(&state.db).await.map_err(username_conflict)?;

    // Setlist entries embed the creator's username.
    state.cache.invalidate(SETLISTS_KEY).await?;

    Ok(Json(MessageResponse::new("User updated", id)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    operation_id = "deleteUser",
    summary = "Delete a user account",
    description = "Admin only. Admins cannot delete their own account. Accounts that still \
        own songs or setlists cannot be deleted.",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Cannot delete yourself (SELF_DELETE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "User still owns content (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = id))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    auth_user.require(Capability::ManageUsers)?;

    if id == auth_user.user_id {
        return Err(AppError::SelfDelete);
    }

    user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    user::Entity::delete_by_id(id)
        .exec(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => AppError::Conflict(
                "User still owns songs or setlists and cannot be deleted".into(),
            ),
            _ => AppError::from(e),
        })?;

    state.cache.invalidate(SETLISTS_KEY).await?;
    tracing::info!(user_id = id, "User deleted");

    Ok(Json(MessageResponse::new("User deleted", id)))
}
