//! The PostgreSQL adapter.
//!
//! `PgDriver` ties the pool manager, client tracking, and statement
//! execution together behind the [`SqlDriver`] contract. One instance owns
//! one (optional) pool and its own active-client counter; multiple
//! instances with independent configurations can coexist.

use crate::config::PgConfig;
use crate::db::client::PgClient;
use crate::db::executor;
use crate::db::lifecycle::ClientTracker;
use crate::db::params::SqlParam;
use crate::db::pool::PoolManager;
use crate::db::transaction::{self, IsolationLevel};
use crate::db::types::{self, Row};
use crate::driver::{MigrationConn, SqlDriver};
use crate::error::{DriverError, DriverResult};
use crate::migrations;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{Connection, PgConnection};
use std::sync::Arc;
use tracing::error;

pub struct PgDriver {
    config: PgConfig,
    pool: PoolManager,
    tracker: Arc<ClientTracker>,
}

impl PgDriver {
    pub fn new(config: PgConfig) -> Self {
        let tracker = Arc::new(ClientTracker::new());
        let pool = PoolManager::new(config.clone(), Arc::clone(&tracker));
        Self {
            config,
            pool,
            tracker,
        }
    }

    pub fn config(&self) -> &PgConfig {
        &self.config
    }

    /// Diagnostic view of the active-client counter.
    #[doc(hidden)]
    pub fn active_clients(&self) -> i64 {
        self.tracker.count()
    }
}

#[async_trait]
impl SqlDriver for PgDriver {
    type Client = PgClient;

    async fn initialize(&self) -> DriverResult<()> {
        self.pool.initialize().await;
        Ok(())
    }

    async fn shutdown(&self) -> DriverResult<()> {
        self.pool.destroy().await;
        Ok(())
    }

    async fn get_client(&self) -> DriverResult<PgClient> {
        if self.pool.has_pool().await {
            let conn = self.pool.acquire().await?;
            Ok(PgClient::Pooled(conn))
        } else {
            let conn = PgConnection::connect_with(&self.config.connect_options()).await?;
            self.tracker.checkout();
            Ok(PgClient::Direct(conn))
        }
    }

    async fn release_client(&self, client: PgClient) {
        self.pool.release(client).await;
    }

    async fn query(
        &self,
        client: &mut PgClient,
        sql: &str,
        params: &[SqlParam],
    ) -> DriverResult<Vec<Option<Row>>> {
        executor::query(client.conn(), sql, params).await
    }

    async fn exec(
        &self,
        client: &mut PgClient,
        sql: &str,
        params: &[SqlParam],
    ) -> DriverResult<usize> {
        executor::exec(client.conn(), sql, params).await
    }

    async fn start_transaction(
        &self,
        client: &mut PgClient,
        isolation_code: &str,
    ) -> DriverResult<()> {
        let Some(level) = IsolationLevel::from_code(isolation_code) else {
            error!(code = %isolation_code, "invalid transaction isolation level");
            return Err(DriverError::InvalidIsolationLevel {
                code: isolation_code.to_string(),
            });
        };
        transaction::begin(client.conn(), level).await
    }

    async fn ensure_migrations_table(&self, table: &str) -> DriverResult<()> {
        migrations::check_table_name(table)?;
        let mut client = self.get_client().await?;
        let result = self
            .exec(&mut client, &migrations::ensure_table_sql(table), &[])
            .await;
        self.release_client(client).await;
        result.map(|_| ())
    }

    async fn list_executed_migration_names(&self, table: &str) -> DriverResult<Vec<String>> {
        migrations::check_table_name(table)?;
        let mut client = self.get_client().await?;
        let result = self
            .query(&mut client, &migrations::list_names_sql(table), &[])
            .await;
        self.release_client(client).await;

        let rows = result?;
        let mut names = Vec::with_capacity(rows.len());
        for row in rows.into_iter().flatten() {
            if let Some(JsonValue::String(name)) = row.get("name") {
                names.push(name.clone());
            }
        }
        Ok(names)
    }

    async fn log_migration_successful(
        &self,
        conn: &mut dyn MigrationConn,
        table: &str,
        migration: &str,
    ) -> DriverResult<()> {
        migrations::check_table_name(table)?;
        let completed_at = self.date_iso(Utc::now());
        conn.exec(
            &migrations::record_sql(table),
            &[
                SqlParam::String(migration.to_string()),
                SqlParam::String(completed_at),
            ],
        )
        .await?;
        Ok(())
    }

    fn migration_tx_isolation_level(&self) -> &'static str {
        migrations::MIGRATION_TX_ISOLATION.as_code()
    }

    fn date_iso(&self, ts: DateTime<Utc>) -> String {
        types::iso_timestamp(ts)
    }
}
