use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::engine::registry::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub conn: DatabaseConnection,
    pub config: Config,
    pub sessions: SessionRegistry,
}
