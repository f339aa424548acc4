//! Database layer for circle: entities, migrations and repositories over
//! a pooled `PostgreSQL` connection.

pub mod entities;
pub mod migrations;
pub mod repositories;
pub mod test_utils;

use circle_common::{AppError, config::DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::log::LevelFilter;

/// Pool options derived from the `[database]` config section.
#[must_use]
pub fn connect_options(config: &DatabaseConfig) -> ConnectOptions {
    let mut opt = ConnectOptions::new(&config.url);

    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    opt
}

/// Open the connection pool.
pub async fn init(config: &DatabaseConfig) -> Result<DatabaseConnection, AppError> {
    tracing::debug!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Opening database pool"
    );

    Database::connect(connect_options(config))
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Run pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    use sea_orm_migration::MigratorTrait;
    migrations::Migrator::up(db, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}
