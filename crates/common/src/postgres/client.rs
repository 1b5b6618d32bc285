use anyhow::{Context, Result};
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use tracing::{debug, info};

use super::PostgresConfig;

/// Embedded schema migrations, applied in order
const MIGRATIONS: &[(&str, &str)] = &[(
    "20240101000000_create_measurements",
    include_str!("../../migrations/postgres/20240101000000_create_measurements.sql"),
)];

/// Advisory lock key serializing concurrent migration runs
const MIGRATION_LOCK_ID: i64 = 0x7061_7274_6963_6c65;

/// PostgreSQL client wrapper with connection pooling
#[derive(Clone)]
pub struct PostgresClient {
    pool: Pool,
}

impl PostgresClient {
    /// Creates a new PostgreSQL client with connection pooling
    ///
    /// No connection is opened until the first query; call [`Self::ping`] to
    /// check connectivity at startup.
    pub fn new(
        host: &str,
        port: u16,
        database: &str,
        username: &str,
        password: &str,
        max_pool_size: usize,
    ) -> Result<Self> {
        let mut cfg = Config::new();
        cfg.host = Some(host.to_string());
        cfg.port = Some(port);
        cfg.dbname = Some(database.to_string());
        cfg.user = Some(username.to_string());
        cfg.password = Some(password.to_string());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;
        pool.resize(max_pool_size);

        Ok(Self { pool })
    }

    pub fn from_config(config: &PostgresConfig) -> Result<Self> {
        Self::new(
            &config.host,
            config.port,
            &config.database,
            &config.username,
            &config.password,
            config.max_pool_size,
        )
    }

    /// Pings the database to verify connectivity
    pub async fn ping(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client.execute("SELECT 1", &[]).await?;
        debug!("postgreSQL connection successful");
        Ok(())
    }

    /// Gets a connection from the pool
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Client> {
        Ok(self.pool.get().await?)
    }

    /// Applies every embedded migration that has not run yet
    ///
    /// Runs in one transaction holding a transaction-scoped advisory lock, so
    /// instances starting together apply each migration exactly once.
    pub async fn run_migrations(&self) -> Result<()> {
        let mut client = self.get_connection().await?;
        let tx = client
            .transaction()
            .await
            .context("Failed to start migration transaction")?;

        tx.execute("SELECT pg_advisory_xact_lock($1)", &[&MIGRATION_LOCK_ID])
            .await
            .context("Failed to acquire migration lock")?;

        tx.batch_execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version TEXT PRIMARY KEY,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .await
        .context("Failed to create schema_migrations table")?;

        for (version, sql) in MIGRATIONS {
            let applied = tx
                .query_opt(
                    "SELECT version FROM schema_migrations WHERE version = $1",
                    &[version],
                )
                .await?
                .is_some();
            if applied {
                debug!(version = %version, "migration already applied");
                continue;
            }

            tx.batch_execute(sql)
                .await
                .with_context(|| format!("Migration {} failed", version))?;
            tx.execute(
                "INSERT INTO schema_migrations (version) VALUES ($1)",
                &[version],
            )
            .await?;
            info!(version = %version, "applied migration");
        }

        tx.commit()
            .await
            .context("Failed to commit migrations")?;
        Ok(())
    }
}
