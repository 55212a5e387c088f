use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "setlists")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub name: String,
    pub date: Option<Date>,

    pub created_by: Option<i32>,
    #[sea_orm(belongs_to, from = "created_by", to = "id")]
    pub creator: HasOne<super::user::Entity>,

    #[sea_orm(has_many, via = "setlist_song")]
    pub songs: HasMany<super::song::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
