use serde::{Deserialize, Serialize};

use crate::entity::role::Role;
use crate::entity::user;
use crate::error::AppError;

pub const USERNAME_MAX: usize = 50;
pub const PASSWORD_MAX: usize = 128;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "worship_leader")]
    pub username: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    pub role: Role,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    #[schema(example = "worship_leader")]
    pub username: String,
    pub role: Role,
    /// New password. Omit or leave blank to keep the current one.
    pub password: Option<String>,
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > USERNAME_MAX {
        return Err(AppError::Validation(format!(
            "Username must be 1-{USERNAME_MAX} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, '_', '.' and '-'".into(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.is_empty() || password.chars().count() > PASSWORD_MAX {
        return Err(AppError::Validation(format!(
            "Password must be 1-{PASSWORD_MAX} characters"
        )));
    }
    Ok(())
}

pub fn validate_create_user(payload: &CreateUserRequest) -> Result<(), AppError> {
    validate_username(&payload.username)?;
    validate_password(&payload.password)
}

pub fn validate_update_user(payload: &UpdateUserRequest) -> Result<(), AppError> {
    validate_username(&payload.username)?;
    match payload.password.as_deref() {
        Some(p) if !p.is_empty() => validate_password(p),
        _ => Ok(()),
    }
}

/// A user account without its password hash.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    #[schema(example = 2)]
    pub id: i32,
    #[schema(example = "worship_leader")]
    pub username: String,
    pub role: Role,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: model.role,
        }
    }
}
