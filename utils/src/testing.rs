use migration::{DbErr, Migrator, MigratorTrait, SchemaManager};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Fresh migrated database for tests. An in-memory sqlite database exists
/// per connection, so the pool is pinned to a single one.
pub async fn setup_test_db(url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(url);
    opt.max_connections(1);

    let conn = Database::connect(opt).await?;
    Migrator::up(&conn, None).await?;

    let schema_manager = SchemaManager::new(&conn);
    assert!(schema_manager.has_table("players").await?);
    assert!(schema_manager.has_table("tournaments").await?);
    assert!(schema_manager.has_table("tournament_players").await?);
    assert!(schema_manager.has_table("matches").await?);

    Ok(conn)
}
