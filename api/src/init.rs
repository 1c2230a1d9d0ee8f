use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use app::config::Config;
use app::state::AppState;

use crate::routers::create_router;

pub fn setup_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::OPTIONS, Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-user-id"),
            HeaderName::from_static("x-username"),
        ])
        .allow_origin(
            state
                .config
                .allowed_origin
                .parse::<HeaderValue>()
                .expect("Failed to parse allowed origin"),
        )
        .allow_credentials(true);

    create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub fn setup_config() -> Config {
    Config::from_env()
}

pub async fn setup_db(db_url: &str) -> DatabaseConnection {
    let mut opt = ConnectOptions::new(db_url);
    opt.max_lifetime(std::time::Duration::from_secs(60));
    opt.max_connections(16);

    Database::connect(opt)
        .await
        .expect("Database connection failed")
}
