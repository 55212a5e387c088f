use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pairing of a setlist and a song. The pair is the whole identity.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "setlist_songs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub setlist_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub song_id: i32,
    #[sea_orm(belongs_to, from = "setlist_id", to = "id")]
    pub setlist: Option<super::setlist::Entity>,
    #[sea_orm(belongs_to, from = "song_id", to = "id")]
    pub song: Option<super::song::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
