//! Ludotheque (game catalog) endpoints.

use axum::{extract::State, Extension};

use super::{respond, success, ApiJson, ApiPath, ApiQuery, ApiResult};
use crate::auth::{require_admin, Session};
use crate::errors::AppError;
use crate::ludotheque::GameQuery;
use crate::models::{CatalogEntry, Game, GameFields, ListGamesParams, OwnerCount};
use crate::notify::NotificationLog;
use crate::AppState;

/// GET /api/ludotheque - List games, longest first.
///
/// Query: `duree` (`all`, `N` or `N+`), `q` (search), `proprietaire`.
/// Each row carries its values folded over attached extensions.
pub async fn list_games(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListGamesParams>,
) -> ApiResult<Vec<CatalogEntry>> {
    let query = GameQuery::try_from(params).map_err(AppError::from)?;
    let club = state.club.lock().await;
    success(club.list_games(&query))
}

/// GET /api/ludotheque/{id} - Get a single game.
pub async fn get_game(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<Game> {
    let club = state.club.lock().await;
    match club.get_game(id) {
        Some(game) => success(game.clone()),
        None => Err(AppError::NotFound(format!("Jeu {} introuvable", id)).into()),
    }
}

/// GET /api/ludotheque/proprietaires - Owners and their game counts.
pub async fn list_owners(State(state): State<AppState>) -> ApiResult<Vec<OwnerCount>> {
    let club = state.club.lock().await;
    success(club.owners())
}

/// POST /api/ludotheque - Add a game (admin).
pub async fn create_game(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiJson(fields): ApiJson<GameFields>,
) -> ApiResult<Game> {
    require_admin(&session)?;

    let mut log = NotificationLog::new();
    let result = state.club.lock().await.add_game(&fields, &mut log);
    respond(result, log)
}

/// PUT /api/ludotheque/{id} - Edit a game (admin).
pub async fn update_game(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<u64>,
    ApiJson(fields): ApiJson<GameFields>,
) -> ApiResult<Game> {
    require_admin(&session)?;

    let mut log = NotificationLog::new();
    let result = state.club.lock().await.update_game(id, &fields, &mut log);
    respond(result, log)
}

/// DELETE /api/ludotheque/{id} - Remove a game (admin).
pub async fn delete_game(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<Game> {
    require_admin(&session)?;

    let mut log = NotificationLog::new();
    let result = state.club.lock().await.delete_game(id, &mut log);
    respond(result, log)
}
