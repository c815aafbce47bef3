//! Folio Backend
//!
//! Portfolio/blog REST backend: published posts in SQLite, a filterable post
//! listing and a single admin editor with draft autosave and version history.

mod api;
mod auth;
mod blobs;
mod config;
mod db;
mod editor;
mod errors;
mod filter;
mod models;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::SessionStore;
use blobs::BlobStore;
use config::Config;
use db::Repository;
use editor::EditorController;

/// Largest cover image accepted by the upload route.
const MAX_COVER_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub editor: Arc<EditorController>,
    pub sessions: Arc<SessionStore>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Folio Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Media path: {:?}", config.media_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin_password.is_none() {
        tracing::warn!("No admin password configured (FOLIO_ADMIN_PASSWORD). The editor is open!");
    }

    // Initialize storage
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));
    let blobs = Arc::new(BlobStore::open(&config.media_path, &config.media_url)?);

    // Editor, restored from the last autosaved draft
    let editor = Arc::new(EditorController::new(repo.clone(), blobs, repo.clone()));
    if !editor.load_draft().await {
        tracing::info!("No saved draft, starting with a blank editor");
    }
    let _autosave = editor.spawn_autosave(config.autosave_interval);

    let state = AppState {
        repo,
        editor,
        sessions: Arc::new(SessionStore::new(
            config.admin_password.clone(),
            config.session_ttl,
        )),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let sessions = state.sessions.clone();

    // Public routes
    let public_routes = Router::new()
        .route("/posts", get(api::list_posts))
        .route("/posts/categories", get(api::list_categories))
        .route("/posts/{id}", get(api::get_post))
        .route("/revision", get(api::get_revision))
        .route("/auth/login", post(api::login));

    // Admin routes
    let admin_routes = Router::new()
        .route("/auth/logout", post(api::logout))
        .route("/auth/session", get(api::current_session))
        .route("/editor", get(api::get_editor))
        .route("/editor", patch(api::update_editor))
        .route("/editor/tags", post(api::add_tag))
        .route("/editor/tags/{tag}", delete(api::remove_tag))
        .route(
            "/editor/cover",
            put(api::upload_cover).layer(DefaultBodyLimit::max(MAX_COVER_BYTES)),
        )
        .route("/editor/cover", delete(api::remove_cover))
        .route("/editor/history", get(api::get_history))
        .route("/editor/history/{index}/restore", post(api::restore_snapshot))
        .route("/editor/draft", post(api::flush_draft))
        .route("/editor/save", post(api::save_post))
        .route("/editor/export", get(api::export_markdown))
        .route("/editor/accessibility", get(api::check_accessibility))
        // Apply session auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_auth_layer(sessions.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    let mut router = Router::new()
        .nest("/api", public_routes.merge(admin_routes))
        .merge(health_routes);

    // Serve uploaded media when it is published under a local path
    let media_url = state.config.media_url.as_str();
    if media_url.starts_with('/') && media_url.len() > 1 {
        router = router.nest_service(media_url, ServeDir::new(&state.config.media_path));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
