use serde::{Deserialize, Serialize};

use super::shared::{validate_optional, validate_required};
use crate::entity::song;
use crate::error::AppError;

pub const TITLE_MAX: usize = 100;
pub const ARTIST_MAX: usize = 100;
pub const KEY_SIGNATURE_MAX: usize = 10;

/// Request body for creating a song, and for replacing one in full.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SongRequest {
    #[schema(example = "Amazing Grace")]
    pub title: String,
    #[schema(example = "John Newton")]
    pub artist: Option<String>,
    #[schema(example = "G")]
    pub key_signature: Option<String>,
    pub lyrics: Option<String>,
}

pub fn validate_song_request(payload: &SongRequest) -> Result<(), AppError> {
    validate_required("Title", &payload.title, TITLE_MAX)?;
    validate_optional("Artist", payload.artist.as_deref(), ARTIST_MAX)?;
    validate_optional(
        "Key signature",
        payload.key_signature.as_deref(),
        KEY_SIGNATURE_MAX,
    )?;
    Ok(())
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct SongResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Amazing Grace")]
    pub title: String,
    pub artist: Option<String>,
    #[schema(example = "G")]
    pub key_signature: Option<String>,
    pub lyrics: Option<String>,
    /// ID of the user who created the song.
    pub created_by: Option<i32>,
}

impl From<song::Model> for SongResponse {
    fn from(model: song::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            artist: model.artist,
            key_signature: model.key_signature,
            lyrics: model.lyrics,
            created_by: model.created_by,
        }
    }
}
