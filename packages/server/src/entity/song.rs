use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "songs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub title: String,
    #[sea_orm(column_type = "String(StringLen::N(100))", nullable)]
    pub artist: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(10))", nullable)]
    pub key_signature: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub lyrics: Option<String>,

    pub created_by: Option<i32>,
    #[sea_orm(belongs_to, from = "created_by", to = "id")]
    pub creator: HasOne<super::user::Entity>,

    #[sea_orm(has_many, via = "setlist_song")]
    pub setlists: HasMany<super::setlist::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
