use migration::MigratorTrait;
use tokio::sync::watch;

use app::engine::registry::SessionRegistry;
use app::state::AppState;

pub async fn run() {
    let config = api::setup_config();
    let conn = api::setup_db(&config.db_url).await;
    migration::Migrator::up(&conn, None)
        .await
        .expect("Migration failed");

    let state = AppState {
        conn: conn.clone(),
        config: config.clone(),
        sessions: SessionRegistry::new(),
    };

    // the consumer observes the same flag axum's graceful shutdown uses
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = tokio::spawn(app::consumer::run_consumer(
        config.clone(),
        conn,
        shutdown_rx,
    ));

    let router = api::setup_router(state);
    let address = config.get_server_url();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind server address");
    tracing::info!("Listening on {address}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server crashed");

    shutdown_tx.send(true).ok();
    consumer.await.ok();
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl-c");
}
