use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::shared::{empty_string_as_none, validate_required};
use super::song::SongResponse;
use crate::entity::setlist;
use crate::error::AppError;

pub const NAME_MAX: usize = 100;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSetlistRequest {
    #[schema(example = "Easter Sunday")]
    pub name: String,
    /// Service date (`YYYY-MM-DD`). Blank means no date.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[schema(example = "2025-04-20")]
    pub date: Option<NaiveDate>,
    /// Songs to include. Duplicates are ignored.
    #[serde(default, rename = "songIds", alias = "song_ids")]
    #[schema(example = json!([1, 2]))]
    pub song_ids: Vec<i32>,
}

pub fn validate_create_setlist(payload: &CreateSetlistRequest) -> Result<(), AppError> {
    validate_required("Name", &payload.name, NAME_MAX)
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateSetlistRequest {
    #[schema(example = "Easter Sunday (late service)")]
    pub name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[schema(example = "2025-04-20")]
    pub date: Option<NaiveDate>,
    /// When present, replaces every song in the setlist. An empty list clears it.
    #[serde(default, rename = "songIds", alias = "song_ids")]
    pub song_ids: Option<Vec<i32>>,
}

pub fn validate_update_setlist(payload: &UpdateSetlistRequest) -> Result<(), AppError> {
    validate_required("Name", &payload.name, NAME_MAX)
}

/// Entry of the setlist list, with the creator's username joined in.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct SetlistListItem {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "Easter Sunday")]
    pub name: String,
    #[schema(example = "2025-04-20")]
    pub date: Option<NaiveDate>,
    pub created_by: Option<i32>,
    #[schema(example = "worship_leader")]
    pub created_by_username: Option<String>,
}

impl SetlistListItem {
    pub fn new(model: setlist::Model, creator: Option<String>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            date: model.date,
            created_by: model.created_by,
            created_by_username: creator,
        }
    }
}

/// A setlist with its songs.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SetlistDetailResponse {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "Easter Sunday")]
    pub name: String,
    #[schema(example = "2025-04-20")]
    pub date: Option<NaiveDate>,
    pub created_by: Option<i32>,
    pub songs: Vec<SongResponse>,
}

impl SetlistDetailResponse {
    pub fn new(model: setlist::Model, songs: Vec<SongResponse>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            date: model.date,
            created_by: model.created_by,
            songs,
        }
    }
}
