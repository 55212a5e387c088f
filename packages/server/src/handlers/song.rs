use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{setlist_song, song};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, Capability};
use crate::extractors::json::AppJson;
use crate::models::shared::MessageResponse;
use crate::models::song::*;
use crate::state::AppState;
use crate::utils::cache::{SONGS_KEY, cached_list};

/// Trim optional text, collapsing blank input to `None`.
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[utoipa::path(
    get,
    path = "/api/songs",
    tag = "Songs",
    operation_id = "listSongs",
    summary = "List all songs",
    description = "Returns every song in the library. Served from the list cache when warm.",
    responses(
        (status = 200, description = "All songs", body = Vec<SongResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_songs(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SongResponse>>, AppError> {
    auth_user.require(Capability::ViewContent)?;

    let db = &state.db;
    let songs = cached_list(&*state.cache, SONGS_KEY, state.cache_ttl(), || async move {
        let rows = song::Entity::find()
            .order_by_asc(song::Column::Id)
            .all(db)
            .await?;
        Ok::<_, AppError>(rows.into_iter().map(SongResponse::from).collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(songs))
}

#[utoipa::path(
    post,
    path = "/api/songs",
    tag = "Songs",
    operation_id = "createSong",
    summary = "Add a song to the library",
    description = "Requires the admin or leader role. The caller is recorded as the creator.",
    request_body = SongRequest,
    responses(
        (status = 201, description = "Song created", body = MessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_song(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SongRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Capability::ManageContent)?;
    validate_song_request(&payload)?;

    let model = song::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        artist: Set(normalize(payload.artist)),
        key_signature: Set(normalize(payload.key_signature)),
        lyrics: Set(payload.lyrics.filter(|l| !l.trim().is_empty())),
        created_by: Set(Some(auth_user.user_id)),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    state.cache.invalidate(SONGS_KEY).await?;
    tracing::info!(song_id = model.id, "Song created");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Song created", model.id)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/songs/{id}",
    tag = "Songs",
    operation_id = "updateSong",
    summary = "Replace a song's fields",
    description = "Overwrites title, artist, key signature and lyrics. The creator is kept.",
    params(("id" = i32, Path, description = "Song ID")),
    request_body = SongRequest,
    responses(
        (status = 200, description = "Song updated", body = MessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Song not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(song_id = id))]
pub async fn update_song(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SongRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    auth_user.require(Capability::ManageContent)?;
    validate_song_request(&payload)?;

    let existing = song::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Song not found".into()))?;

    let mut active: song::ActiveModel = existing.into();
    active.title = Set(payload.title.trim().to_string());
    active.artist = Set(normalize(payload.artist));
    active.key_signature = Set(normalize(payload.key_signature));
    active.lyrics = Set(payload.lyrics.filter(|l| !l.trim().is_empty()));
    active.update(&state.db).await?;

    state.cache.invalidate(SONGS_KEY).await?;

    Ok(Json(MessageResponse::new("Song updated", id)))
}

#[utoipa::path(
    delete,
    path = "/api/songs/{id}",
    tag = "Songs",
    operation_id = "deleteSong",
    summary = "Delete a song",
    description = "Removes the song from every setlist that contains it, then deletes it.",
    params(("id" = i32, Path, description = "Song ID")),
    responses(
        (status = 200, description = "Song deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Song not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(song_id = id))]
pub async fn delete_song(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    auth_user.require(Capability::ManageContent)?;

    let txn = state.db.begin().await?;

    song::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Song not found".into()))?;

    let unlinked = setlist_song::Entity::delete_many()
        .filter(setlist_song::Column::SongId.eq(id))
        .exec(&txn)
        .await?;
    song::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    state.cache.invalidate(SONGS_KEY).await?;
    tracing::info!(
        song_id = id,
        setlist_links = unlinked.rows_affected,
        "Song deleted"
    );

    Ok(Json(MessageResponse::new("Song deleted", id)))
}
