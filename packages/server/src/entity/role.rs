use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Access tier of a team member.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full control, including user management.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Manages songs, setlists and uploads.
    #[sea_orm(string_value = "leader")]
    Leader,
    /// Read-only access.
    #[sea_orm(string_value = "member")]
    Member,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Leader => "leader",
            Role::Member => "member",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
