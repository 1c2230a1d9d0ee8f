use axum::Router;

pub mod root;
pub mod session;
pub mod tournament;
mod ws;

use app::state::AppState;
use session::create_session_router;
use tournament::create_tournament_router;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(root::create_root_router())
        .nest("/sessions", create_session_router())
        .nest("/tournaments", create_tournament_router())
        .with_state(state)
}
