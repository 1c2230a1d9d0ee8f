use axum::{
    Extension, Router,
    extract::{Path, Query, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};

use app::persistence::matches::match_to_play;
use app::persistence::tournaments::{
    create_tournament, get_tournament, join_tournament, search_open_tournaments,
};
use app::state::AppState;
use models::queries::PaginationQuery;
use models::schemas::matches::MatchSchema;
use models::schemas::player::Principal;
use models::schemas::tournament::TournamentSchema;

use crate::extractor::Json;
use crate::{ApiResponse, error::ApiError};

async fn tournaments_post(
    state: State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let tournament = create_tournament(&state.conn, &principal)
        .await
        .map_err(ApiError::from)?;

    let result = ApiResponse::success(
        "Tournament created successfully",
        Some(TournamentSchema::from(tournament)),
    );

    Ok(Json(result))
}

/// Pending and started tournaments only; finished ones are history, not
/// joinable listings.
async fn tournaments_get(
    state: State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let result = search_open_tournaments(&state.conn, query)
        .await
        .map_err(ApiError::from)?;

    let response = ApiResponse::success("Tournaments retrieved successfully", Some(result));

    Ok(Json(response))
}

async fn tournaments_id_get(
    state: State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let result = get_tournament(&state.conn, &id)
        .await
        .map_err(ApiError::from)?;

    let response = ApiResponse::success("Tournament retrieved successfully", Some(result));

    Ok(Json(response))
}

async fn tournaments_id_join_post(
    state: State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tournament = join_tournament(&state.conn, &principal, &id)
        .await
        .map_err(ApiError::from)?;

    let result = ApiResponse::success(
        "Tournament joined",
        Some(TournamentSchema::from(tournament)),
    );

    Ok(Json(result))
}

async fn tournaments_id_match_to_play_get(
    state: State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = match_to_play(&state.conn, &id, principal.id)
        .await
        .map_err(ApiError::from)?;

    let result = ApiResponse::success("Match to play", Some(MatchSchema::from(row)));

    Ok(Json(result))
}

pub fn create_tournament_router() -> Router<AppState> {
    Router::new()
        .route("/", get(tournaments_get))
        .route("/", post(tournaments_post))
        .route("/{id}", get(tournaments_id_get))
        .route("/{id}/join", post(tournaments_id_join_post))
        .route("/{id}/match-to-play", get(tournaments_id_match_to_play_get))
        .route_layer(middleware::from_fn(crate::middleware::principal::principal))
}
