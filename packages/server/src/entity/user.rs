use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::role::Role;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique, column_type = "String(StringLen::N(50))")]
    pub username: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,

    #[sea_orm(has_many)]
    pub songs: HasMany<super::song::Entity>,

    #[sea_orm(has_many)]
    pub setlists: HasMany<super::setlist::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
