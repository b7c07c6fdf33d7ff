//! Test utilities for database operations.
//!
//! Tests run against a private in-memory `SQLite` database by default. Set
//! `TEST_DATABASE_URL` to point them at a real server instead.

use std::sync::Arc;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

/// URL used when `TEST_DATABASE_URL` is not set.
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Test database configuration.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database URL.
    pub url: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| IN_MEMORY_URL.to_string()),
        }
    }
}

impl TestDbConfig {
    /// Whether this points at an in-memory `SQLite` database.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with("sqlite::memory:")
    }
}

/// A migrated test database.
pub struct TestDatabase {
    /// Database connection, shared with the repositories under test.
    pub conn: Arc<DatabaseConnection>,
    /// Database configuration.
    pub config: TestDbConfig,
}

impl TestDatabase {
    /// Connect using the default configuration and run all migrations.
    pub async fn new() -> Result<Self, DbErr> {
        Self::with_config(TestDbConfig::default()).await
    }

    /// Connect with a custom configuration and run all migrations.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(&config.url);
        // An in-memory database lives as long as its connection
        if config.is_in_memory() {
            opt.max_connections(1).min_connections(1);
        }
        opt.sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!(url = %config.url, "Connected to test database");

        Ok(Self {
            conn: Arc::new(conn),
            config,
        })
    }

    /// Get the database connection.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// A shared handle to the connection, for building repositories.
    #[must_use]
    pub fn shared(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Delete all rows, children first.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        let backend = self.conn.get_database_backend();
        for table in ["comment", "follow", "post", "group", "user"] {
            self.conn
                .execute(Statement::from_string(
                    backend,
                    format!("DELETE FROM \"{table}\""),
                ))
                .await?;
        }

        info!("Cleaned up test database");
        Ok(())
    }
}
