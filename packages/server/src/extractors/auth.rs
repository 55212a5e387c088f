use axum::{extract::FromRequestParts, http::request::Parts};

use crate::entity::role::Role;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// A class of operations guarded by a fixed set of roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Read songs, setlists and one's own profile.
    ViewContent,
    /// Create, edit and delete songs and setlists.
    ManageContent,
    /// Upload files.
    UploadFiles,
    /// List, create, edit and delete user accounts.
    ManageUsers,
}

impl Capability {
    /// Roles allowed to exercise this capability.
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Capability::ViewContent => &[Role::Admin, Role::Leader, Role::Member],
            Capability::ManageContent | Capability::UploadFiles => &[Role::Admin, Role::Leader],
            Capability::ManageUsers => &[Role::Admin],
        }
    }

    pub fn allows(self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }
}

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
/// Role checks happen via `require()` in the handler body.
#[derive(Debug)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    /// Returns `Ok(())` if the user's role grants `capability`, `Err(PermissionDenied)` otherwise.
    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if capability.allows(self.role) {
            Ok(())
        } else {
            tracing::debug!(
                user_id = self.user_id,
                role = %self.role,
                ?capability,
                "Permission denied"
            );
            Err(AppError::PermissionDenied)
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer")
            .ok_or(AppError::TokenInvalid)?
            .trim();
        if token.is_empty() {
            return Err(AppError::TokenMissing);
        }

        let claims =
            jwt::verify(token, &state.config.auth.jwt_secret).map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthUser {
            user_id: claims.uid,
            username: claims.sub,
            role: claims.role,
        })
    }
}
