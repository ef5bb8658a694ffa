//! Shared helpers for integration tests.
//!
//! These tests need a running PostgreSQL server. Set DB_NAME and DB_USER
//! (plus DB_HOST, DB_PORT, DB_PASSWORD as needed) to run them; each test
//! skips with a message otherwise.

#![allow(dead_code)]

use sqldb_pg::{PgConfig, PgDriver, SqlDriver};
use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Route driver logs through a test subscriber, honoring RUST_LOG.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Build an unpooled test configuration from the environment, or `None`
/// when no database is configured.
pub fn test_config() -> Option<PgConfig> {
    init_tracing();
    let database = std::env::var("DB_NAME").ok()?;
    let username = std::env::var("DB_USER").ok()?;
    Some(PgConfig {
        host: std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
        port: std::env::var("DB_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5432),
        username,
        password: std::env::var("DB_PASSWORD").ok(),
        database,
        ssl: false,
        ssl_reject_unauthorized: true,
        pool_size: Some(0),
        client_idle_timeout_ms: None,
        acquire_timeout_ms: None,
    })
}

/// Same configuration with pooling enabled.
pub fn pooled(mut config: PgConfig, size: u32) -> PgConfig {
    config.pool_size = Some(size);
    config
}

/// Tests run concurrently, so every test works in its own table.
pub fn unique_table(prefix: &str) -> String {
    format!("{}_{:08x}", prefix, rand::random::<u32>())
}

pub async fn recreate_table(driver: &PgDriver, table: &str, columns: &str) {
    let mut client = driver.get_client().await.expect("get client");
    driver
        .exec(&mut client, &format!("DROP TABLE IF EXISTS {table}"), &[])
        .await
        .expect("drop table");
    driver
        .exec(&mut client, &format!("CREATE TABLE {table}({columns})"), &[])
        .await
        .expect("create table");
    driver.release_client(client).await;
}

pub async fn drop_table(driver: &PgDriver, table: &str) {
    let mut client = driver.get_client().await.expect("get client");
    let _ = driver
        .exec(&mut client, &format!("DROP TABLE IF EXISTS {table}"), &[])
        .await;
    driver.release_client(client).await;
}
