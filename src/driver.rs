//! The generic driver contract.
//!
//! `SqlDriver` is the uniform surface a database adapter exposes to generic
//! callers (application code, migration tooling): connection lifecycle,
//! statement execution, transaction control, and migration bookkeeping.
//! Commit and rollback have default implementations that issue plain
//! `COMMIT`/`ROLLBACK` statements; adapters may override them if their
//! engine needs more.

use crate::db::params::SqlParam;
use crate::db::types::Row;
use crate::error::DriverResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait SqlDriver: Send + Sync {
    /// A checked-out connection, exclusively owned by the caller until
    /// released.
    type Client: Send;

    /// Prepare the adapter for use. Must be called before any other
    /// operation.
    async fn initialize(&self) -> DriverResult<()>;

    /// Release pooled resources. Safe to call when no pool was ever
    /// created.
    async fn shutdown(&self) -> DriverResult<()>;

    /// Check out a client, from the pool when one exists.
    async fn get_client(&self) -> DriverResult<Self::Client>;

    /// Hand a client back. Best-effort: failures while returning or closing
    /// the underlying connection are not surfaced.
    async fn release_client(&self, client: Self::Client);

    /// Execute a statement and return its normalized row sequence: one
    /// entry per affected row, `None` where the engine returned no column
    /// data for a counted row.
    async fn query(
        &self,
        client: &mut Self::Client,
        sql: &str,
        params: &[SqlParam],
    ) -> DriverResult<Vec<Option<Row>>>;

    /// Execute a statement and return the number of rows it affected.
    async fn exec(
        &self,
        client: &mut Self::Client,
        sql: &str,
        params: &[SqlParam],
    ) -> DriverResult<usize>;

    /// Begin a transaction at the isolation level named by its short code
    /// (`rc`, `rr`, `ser`). Unknown codes fail before any statement is
    /// sent.
    async fn start_transaction(
        &self,
        client: &mut Self::Client,
        isolation_code: &str,
    ) -> DriverResult<()>;

    /// Commit the current transaction.
    async fn commit(&self, client: &mut Self::Client) -> DriverResult<()> {
        self.exec(client, "COMMIT", &[]).await?;
        Ok(())
    }

    /// Roll back the current transaction.
    async fn rollback(&self, client: &mut Self::Client) -> DriverResult<()> {
        self.exec(client, "ROLLBACK", &[]).await?;
        Ok(())
    }

    /// Create the migrations-tracking table if it does not already exist.
    /// Never alters an existing table.
    async fn ensure_migrations_table(&self, table: &str) -> DriverResult<()>;

    /// Names of completed migrations, in ascending name order.
    async fn list_executed_migration_names(&self, table: &str) -> DriverResult<Vec<String>>;

    /// Record a completed migration with the current timestamp.
    async fn log_migration_successful(
        &self,
        conn: &mut dyn MigrationConn,
        table: &str,
        migration: &str,
    ) -> DriverResult<()>;

    /// The isolation code migrations run under. Fixed policy, not
    /// configurable.
    fn migration_tx_isolation_level(&self) -> &'static str;

    /// Format a timestamp as the engine's expected literal text.
    fn date_iso(&self, ts: DateTime<Utc>) -> String;
}

/// Minimal execution capability handed to the migration bookkeeper,
/// decoupling it from the full client/driver surface.
#[async_trait]
pub trait MigrationConn: Send {
    async fn exec(&mut self, sql: &str, params: &[SqlParam]) -> DriverResult<usize>;
}

/// Adapts a (driver, client) pair into a [`MigrationConn`].
pub struct DriverConn<'a, D: SqlDriver> {
    driver: &'a D,
    client: &'a mut D::Client,
}

impl<'a, D: SqlDriver> DriverConn<'a, D> {
    pub fn new(driver: &'a D, client: &'a mut D::Client) -> Self {
        Self { driver, client }
    }
}

#[async_trait]
impl<D: SqlDriver> MigrationConn for DriverConn<'_, D> {
    async fn exec(&mut self, sql: &str, params: &[SqlParam]) -> DriverResult<usize> {
        self.driver.exec(self.client, sql, params).await
    }
}
