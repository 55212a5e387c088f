use std::collections::HashSet;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::{NullOrdering, Order};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{setlist, setlist_song, song, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, Capability};
use crate::extractors::json::AppJson;
use crate::models::setlist::*;
use crate::models::shared::{MessageResponse, dedup_ids};
use crate::models::song::SongResponse;
use crate::state::AppState;
use crate::utils::cache::{SETLISTS_KEY, cached_list};

/// De-duplicate `ids` and check that every one names an existing song.
async fn resolve_song_ids<C: ConnectionTrait>(db: &C, ids: &[i32]) -> Result<Vec<i32>, AppError> {
    let ids = dedup_ids(ids);
    if ids.is_empty() {
        return Ok(ids);
    }

    let found: HashSet<i32> = song::Entity::find()
        .select_only()
        .column(song::Column::Id)
        .filter(song::Column::Id.is_in(ids.clone()))
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    if let Some(missing) = ids.iter().find(|id| !found.contains(id)) {
        return Err(AppError::Validation(format!("Song {missing} does not exist")));
    }
    Ok(ids)
}

/// Link `song_ids` to a setlist. Callers resolve the IDs first.
async fn link_songs<C: ConnectionTrait>(
    db: &C,
    setlist_id: i32,
    song_ids: &[i32],
) -> Result<(), DbErr> {
    for &song_id in song_ids {
        let link = setlist_song::ActiveModel {
            setlist_id: Set(setlist_id),
            song_id: Set(song_id),
        };
        setlist_song::Entity::insert(link)
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/setlists",
    tag = "Setlists",
    operation_id = "listSetlists",
    summary = "List all setlists",
    description = "Ordered by service date, newest first, with undated setlists last. Each \
        entry carries its creator's username. Served from the list cache when warm.",
    responses(
        (status = 200, description = "All setlists", body = Vec<SetlistListItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_setlists(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SetlistListItem>>, AppError> {
    auth_user.require(Capability::ViewContent)?;

    let db = &state.db;
    let setlists = cached_list(&*state.cache, SETLISTS_KEY, state.cache_ttl(), || async move {
        let rows = setlist::Entity::find()
            .find_also_related(user::Entity)
            .order_by_with_nulls(setlist::Column::Date, Order::Desc, NullOrdering::Last)
            .order_by_desc(setlist::Column::Id)
            .all(db)
            .await?;
        Ok::<_, AppError>(
            rows.into_iter()
                .map(|(s, creator)| SetlistListItem::new(s, creator.map(|u| u.username)))
                .collect::<Vec<_>>(),
        )
    })
    .await?;

    Ok(Json(setlists))
}

#[utoipa::path(
    get,
    path = "/api/setlists/{id}",
    tag = "Setlists",
    operation_id = "getSetlist",
    summary = "Get a setlist with its songs",
    params(("id" = i32, Path, description = "Setlist ID")),
    responses(
        (status = 200, description = "Setlist with songs", body = SetlistDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Setlist not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(setlist_id = id))]
pub async fn get_setlist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SetlistDetailResponse>, AppError> {
    auth_user.require(Capability::ViewContent)?;

    let model = setlist::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Setlist not found".into()))?;

    let songs = setlist_song::Entity::find()
        .filter(setlist_song::Column::SetlistId.eq(id))
        .find_also_related(song::Entity)
        .order_by_asc(setlist_song::Column::SongId)
        .all(&state.db)
        .await?
        .into_iter()
        .filter_map(|(_, song)| song.map(SongResponse::from))
        .collect();

    Ok(Json(SetlistDetailResponse::new(model, songs)))
}

#[utoipa::path(
    post,
    path = "/api/setlists",
    tag = "Setlists",
    operation_id = "createSetlist",
    summary = "Create a setlist",
    description = "Requires the admin or leader role. Duplicate song IDs are ignored; \
        unknown song IDs are rejected.",
    request_body = CreateSetlistRequest,
    responses(
        (status = 201, description = "Setlist created", body = MessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_setlist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSetlistRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Capability::ManageContent)?;
    validate_create_setlist(&payload)?;

    let txn = state.db.begin().await?;

    let song_ids = resolve_song_ids(&txn, &payload.song_ids).await?;

    let model = setlist::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        date: Set(payload.date),
        created_by: Set(Some(auth_user.user_id)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    link_songs(&txn, model.id, &song_ids).await?;

    txn.commit().await?;

    state.cache.invalidate(SETLISTS_KEY).await?;
    tracing::info!(setlist_id = model.id, songs = song_ids.len(), "Setlist created");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Setlist created", model.id)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/setlists/{id}",
    tag = "Setlists",
    operation_id = "updateSetlist",
    summary = "Update a setlist",
    description = "Overwrites name and date. When `songIds` is present it replaces the \
        setlist's songs; an empty list clears them and an absent field keeps them.",
    params(("id" = i32, Path, description = "Setlist ID")),
    request_body = UpdateSetlistRequest,
    responses(
        (status = 200, description = "Setlist updated", body = MessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Setlist not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(setlist_id = id))]
pub async fn update_setlist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateSetlistRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    auth_user.require(Capability::ManageContent)?;
    validate_update_setlist(&payload)?;

    let existing = setlist::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Setlist not found".into()))?;

    let song_ids = match &payload.song_ids {
        Some(ids) => Some(resolve_song_ids(&state.db, ids).await?),
        None => None,
    };

    let mut active: setlist::ActiveModel = existing.into();
    active.name = Set(payload.name.trim().to_string());
    active.date = Set(payload.date);
    active.update(&state.db).await?;

    // Not atomic: a failure after the delete leaves the setlist without songs.
    if let Some(song_ids) = song_ids {
        setlist_song::Entity::delete_many()
            .filter(setlist_song::Column::SetlistId.eq(id))
            .exec(&state.db)
            .await?;
        link_songs(&state.db, id, &song_ids).await?;
    }

    state.cache.invalidate(SETLISTS_KEY).await?;

    Ok(Json(MessageResponse::new("Setlist updated", id)))
}

#[utoipa::path(
    delete,
    path = "/api/setlists/{id}",
    tag = "Setlists",
    operation_id = "deleteSetlist",
    summary = "Delete a setlist",
    description = "Removes the setlist and its song links. The songs themselves are kept.",
    params(("id" = i32, Path, description = "Setlist ID")),
    responses(
        (status = 200, description = "Setlist deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Setlist not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(setlist_id = id))]
pub async fn delete_setlist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    auth_user.require(Capability::ManageContent)?;

    let txn = state.db.begin().await?;

    setlist::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Setlist not found".into()))?;

    setlist_song::Entity::delete_many()
        .filter(setlist_song::Column::SetlistId.eq(id))
        .exec(&txn)
        .await?;
    setlist::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    state.cache.invalidate(SETLISTS_KEY).await?;
    tracing::info!(setlist_id = id, "Setlist deleted");

    Ok(Json(MessageResponse::new("Setlist deleted", id)))
}
