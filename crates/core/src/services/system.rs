//! Health and database diagnostics.

use std::sync::Arc;
use std::time::Instant;

use agora_common::{AppResult, config::DatabaseConfig};
use agora_db::{ConnectionInfo, repositories::UserRepository};
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// Database reachability as reported by the health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseStatus {
    /// Whether the ping succeeded.
    pub connected: bool,
    /// Failure detail, if any.
    pub error: Option<String>,
}

/// Snapshot returned by the health check.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// `"ok"` or `"degraded"`.
    pub status: &'static str,
    /// Time of the check.
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Seconds since the service started.
    pub uptime: u64,
    /// Database state.
    pub database: DatabaseStatus,
}

impl HealthReport {
    /// Whether every dependency answered.
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        self.database.connected
    }
}

/// Result of the explicit connection test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionTest {
    /// Registered accounts.
    pub user_count: u64,
}

/// Service behind `/health` and `/database/*`.
#[derive(Clone)]
pub struct SystemService {
    db: Arc<DatabaseConnection>,
    user_repo: UserRepository,
    database: DatabaseConfig,
    started_at: Instant,
}

impl SystemService {
    /// Create a new system service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, database: DatabaseConfig) -> Self {
        Self {
            user_repo: UserRepository::new(Arc::clone(&db)),
            db,
            database,
            started_at: Instant::now(),
        }
    }

    /// Ping the database and report uptime.
    pub async fn health(&self) -> HealthReport {
        let database = match agora_db::ping(&self.db).await {
            Ok(()) => DatabaseStatus {
                connected: true,
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Health check could not reach the database");
                DatabaseStatus {
                    connected: false,
                    error: Some(e.to_string()),
                }
            }
        };

        HealthReport {
            status: if database.connected { "ok" } else { "degraded" },
            timestamp: chrono::Utc::now(),
            uptime: self.started_at.elapsed().as_secs(),
            database,
        }
    }

    /// Ping the database and run a trivial query against it.
    pub async fn test_connection(&self) -> AppResult<ConnectionTest> {
        agora_db::ping(&self.db).await?;
        let user_count = self.user_repo.count().await?;

        Ok(ConnectionTest { user_count })
    }

    /// Describe the configured connection without credentials.
    pub fn connection_info(&self) -> AppResult<ConnectionInfo> {
        ConnectionInfo::from_config(&self.database)
    }
}
