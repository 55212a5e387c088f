use axum::{
    Router,
    routing::{get, post, put},
};

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn api_routes(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(song_routes())
        .merge(setlist_routes())
        .merge(user_routes())
        .merge(upload_routes(config.storage.max_upload_size))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/profile", get(handlers::auth::profile))
}

fn song_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/songs",
            get(handlers::song::list_songs).post(handlers::song::create_song),
        )
        .route(
            "/songs/{id}",
            put(handlers::song::update_song).delete(handlers::song::delete_song),
        )
}

fn setlist_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/setlists",
            get(handlers::setlist::list_setlists).post(handlers::setlist::create_setlist),
        )
        .route(
            "/setlists/{id}",
            get(handlers::setlist::get_setlist)
                .put(handlers::setlist::update_setlist)
                .delete(handlers::setlist::delete_setlist),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::user::list_users).post(handlers::user::create_user),
        )
        .route(
            "/users/{id}",
            put(handlers::user::update_user).delete(handlers::user::delete_user),
        )
}

fn upload_routes(max_upload_size: u64) -> Router<AppState> {
    Router::new()
        .route("/upload", post(handlers::upload::upload_file))
        .layer(handlers::upload::upload_body_limit(max_upload_size))
}
