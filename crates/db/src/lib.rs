//! Database layer for agora.

pub mod entities;
pub mod migrations;
pub mod repositories;
pub mod test_utils;

use agora_common::{AppError, config::DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde::Serialize;
use std::time::Duration;
use tracing::log::LevelFilter;

/// Initialize database connection.
pub async fn init(config: &DatabaseConfig) -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new(&config.url);

    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(opt)
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

/// Check that the database answers.
pub async fn ping(db: &DatabaseConnection) -> Result<(), AppError> {
    db.ping()
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Connection metadata safe to expose: no password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    /// Server host.
    pub host: Option<String>,
    /// Server port.
    pub port: Option<u16>,
    /// Database name.
    pub database: Option<String>,
    /// Login role.
    pub username: Option<String>,
    /// Pool upper bound.
    pub max_connections: u32,
    /// Pool lower bound.
    pub min_connections: u32,
}

impl ConnectionInfo {
    /// Describe the configured connection.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, AppError> {
        let url = url::Url::parse(&config.url)
            .map_err(|e| AppError::Config(format!("invalid database url: {e}")))?;

        let database = url
            .path()
            .trim_start_matches('/')
            .split('/')
            .next()
            .filter(|name| !name.is_empty())
            .map(ToString::to_string);
        let username = Some(url.username())
            .filter(|name| !name.is_empty())
            .map(ToString::to_string);

        Ok(Self {
            host: url.host_str().map(ToString::to_string),
            port: url.port_or_known_default().or(Some(5432)),
            database,
            username,
            max_connections: config.max_connections,
            min_connections: config.min_connections,
        })
    }
}
