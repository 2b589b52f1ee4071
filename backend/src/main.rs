//! Ludotheque club backend
//!
//! Serves the club's persisted JSON document, member authentication and the
//! game catalog over a small REST API.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod ludotheque;
mod models;
mod notify;
mod service;
mod sync;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::SessionRegistry;
use config::{Config, StorageKind};
use db::{FileStorage, MemoryStorage, PersistentStore, Storage};
use notify::NotificationLog;
use service::Club;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub club: Arc<Mutex<Club>>,
    pub sessions: Arc<RwLock<SessionRegistry>>,
}

impl AppState {
    pub fn new(club: Club) -> Self {
        Self {
            club: Arc::new(Mutex::new(club)),
            sessions: Arc::new(RwLock::new(SessionRegistry::new())),
        }
    }
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

    tracing::info!("Starting ludotheque backend");
    tracing::info!("Data directory: {:?}", config.data_dir);
    tracing::info!("Storage: {:?} under key {:?}", config.storage, config.storage_key);
    tracing::info!("Remote sync: {:?}", config.remote_sync);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.storage == StorageKind::Memory {
        tracing::warn!("In-memory storage selected (LUDO_STORAGE=memory). Data is lost on exit!");
    }

    let mut club = open_club(&config)?;
    provision_admins(&mut club, &config.admin_pseudos);

    let app = create_router(AppState::new(club));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Open the configured storage and load the club document from it.
pub fn open_club(config: &Config) -> std::io::Result<Club> {
    let storage: Box<dyn Storage> = match config.storage {
        StorageKind::File => Box::new(FileStorage::open(&config.data_dir)?),
        StorageKind::Memory => Box::new(MemoryStorage::new()),
    };
    let persistence = PersistentStore::new(storage, config.storage_key.clone());
    Ok(Club::open(persistence, config.remote_sync.build()))
}

/// Grant the admin role to the configured members that exist.
fn provision_admins(club: &mut Club, pseudos: &[String]) {
    for pseudo in pseudos {
        let already_admin = club
            .store()
            .find_member(pseudo)
            .is_some_and(|m| m.is_admin());
        if already_admin {
            continue;
        }

        let mut log = NotificationLog::new();
        match club.grant_admin(pseudo, &mut log) {
            Ok(_) => tracing::info!("Granted admin role to {}", pseudo),
            Err(e) => tracing::warn!("Cannot grant admin role to {}: {}", pseudo, e),
        }
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes requiring a session
    let session_routes = Router::new()
        .route("/auth/logout", post(api::logout))
        .route("/auth/session", get(api::current_session))
        // Ludotheque
        .route("/ludotheque", get(api::list_games).post(api::create_game))
        .route("/ludotheque/proprietaires", get(api::list_owners))
        .route(
            "/ludotheque/{id}",
            get(api::get_game)
                .put(api::update_game)
                .delete(api::delete_game),
        )
        // Members
        .route("/members", get(api::list_members))
        .route("/members/{pseudo}", delete(api::remove_member))
        .route("/members/{pseudo}/admin", post(api::grant_admin))
        .route("/members/{pseudo}/valider", post(api::validate_member))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::session_layer,
        ));

    let api_routes = Router::new()
        .route("/auth/register", post(api::register))
        .route("/auth/login", post(api::login))
        .merge(session_routes);

    // Health check (no session required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
