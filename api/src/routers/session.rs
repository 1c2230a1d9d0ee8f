use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};

use app::persistence::matches;
use app::scheduler;
use app::state::AppState;
use models::params::session::CreateSessionParams;
use models::schemas::game::{SessionMode, SessionStateSchema};

use crate::extractor::{Json, Valid};
use crate::{ApiResponse, error::ApiError};

/// Create a session, or resume one minted by the bracket. Concurrent calls
/// for one tournament session id converge on a single live instance.
async fn sessions_post(
    state: State<AppState>,
    Valid(Json(params)): Valid<Json<CreateSessionParams>>,
) -> Result<impl IntoResponse, ApiError> {
    let (session_id, session) = match params.mode {
        SessionMode::Tournament => {
            let session_id = params.session_id.ok_or_else(|| {
                ApiError::new(
                    StatusCode::BAD_REQUEST,
                    "sessionId is required for tournament mode",
                )
            })?;
            let row = matches::get_match_by_session(&state.conn, &session_id)
                .await
                .map_err(ApiError::from)?
                .ok_or_else(|| {
                    ApiError::new(StatusCode::NOT_FOUND, "no tournament match for this session")
                })?;
            let session = state.sessions.get_or_create(
                &session_id,
                SessionMode::Tournament,
                row.tournament_id.clone(),
                Some(row.id),
            );
            (session_id, session)
        }
        mode => state.sessions.create(mode),
    };

    if let Some(settings) = params.settings.as_ref() {
        session
            .lock()
            .unwrap()
            .apply_settings(settings)
            .map_err(ApiError::from)?;
    }
    let snapshot = session.lock().unwrap().snapshot();

    let result = ApiResponse::success(
        "Session ready",
        Some(SessionStateSchema {
            session_id,
            snapshot,
        }),
    );

    Ok(Json(result))
}

async fn sessions_id_get(
    state: State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "session not found"))?;
    let snapshot = session.lock().unwrap().snapshot();

    let result = ApiResponse::success(
        "Session state",
        Some(SessionStateSchema {
            session_id: id,
            snapshot,
        }),
    );

    Ok(Json(result))
}

async fn sessions_id_start_post(
    state: State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "session not found"))?;
    scheduler::start_session(&state, &session).map_err(ApiError::from)?;
    let snapshot = session.lock().unwrap().snapshot();

    let result = ApiResponse::success(
        "Session started",
        Some(SessionStateSchema {
            session_id: id,
            snapshot,
        }),
    );

    Ok(Json(result))
}

async fn sessions_id_stop_post(
    state: State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "session not found"))?;
    scheduler::stop_session(&session);
    let snapshot = session.lock().unwrap().snapshot();

    let result = ApiResponse::success(
        "Session stopped",
        Some(SessionStateSchema {
            session_id: id,
            snapshot,
        }),
    );

    Ok(Json(result))
}

async fn sessions_id_delete(
    state: State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .sessions
        .remove(&id)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "session not found"))?;

    let result = ApiResponse::<()>::success("Session deleted", None);

    Ok(Json(result))
}

pub fn create_session_router() -> Router<AppState> {
    Router::new()
        .route("/", post(sessions_post))
        .route("/{id}", get(sessions_id_get))
        .route("/{id}", delete(sessions_id_delete))
        .route("/{id}/start", post(sessions_id_start_post))
        .route("/{id}/stop", post(sessions_id_stop_post))
        .route("/{id}/ws", get(super::ws::session_ws))
        .route_layer(middleware::from_fn(crate::middleware::principal::principal))
}
