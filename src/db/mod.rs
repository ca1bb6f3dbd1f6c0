pub mod entities;
pub mod migrations;
pub mod vector;

use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

/// Connects and runs pending migrations. Called once at startup (SPEC_FULL §A.4).
pub async fn connect(database_url: &str) -> anyhow::Result<DatabaseConnection> {
    let conn = Database::connect(database_url).await?;
    migrations::Migrator::up(&conn, None).await?;
    Ok(conn)
}
