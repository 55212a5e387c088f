pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use std::path::Path;
use std::time::Duration;

use axum::Json;
use axum::http::HeaderValue;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Worship Team API",
        version = "1.0.0",
        description = "Song library, setlists and team accounts for a worship team"
    ),
    paths(
        handlers::health::health,
        handlers::auth::login,
        handlers::auth::profile,
        handlers::song::list_songs,
        handlers::song::create_song,
        handlers::song::update_song,
        handlers::song::delete_song,
        handlers::setlist::list_setlists,
        handlers::setlist::get_setlist,
        handlers::setlist::create_setlist,
        handlers::setlist::update_setlist,
        handlers::setlist::delete_setlist,
        handlers::user::list_users,
        handlers::user::create_user,
        handlers::user::update_user,
        handlers::user::delete_user,
        handlers::upload::upload_file,
    ),
    tags(
        (name = "Auth", description = "Login and the caller's own account"),
        (name = "Songs", description = "Song library"),
        (name = "Setlists", description = "Setlists and their songs"),
        (name = "Users", description = "Team account management"),
        (name = "Uploads", description = "File uploads"),
        (name = "Health", description = "Liveness"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age));

    if config.allow_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);
    let upload_dir = state.config.storage.upload_dir.clone();
    let static_dir = state.config.server.static_dir.clone();

    let mut router = axum::Router::new()
        .nest("/api", routes::api_routes(&state.config))
        .route("/health", get(handlers::health::health))
        .with_state(state)
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()));

    // Serve the pre-built client, falling back to its index for client-side routes.
    if let Some(dir) = static_dir.filter(|d| !d.trim().is_empty()) {
        let index = Path::new(&dir).join("index.html");
        router = router.fallback_service(ServeDir::new(&dir).fallback(ServeFile::new(index)));
    }

    router.layer(TraceLayer::new_for_http()).layer(cors)
}
