//! Integration tests for migration bookkeeping.

mod common;

use chrono::Utc;
use sqldb_pg::{DriverConn, PgDriver, SqlDriver, SqlParam};

#[tokio::test]
async fn test_ensure_creates_table_when_missing() {
    let Some(config) = common::test_config() else {
        eprintln!("Skipping test: DB_NAME / DB_USER not set");
        return;
    };
    let driver = PgDriver::new(config);
    driver.initialize().await.unwrap();

    let table = common::unique_table("migs");
    let mut client = driver.get_client().await.unwrap();

    // Undefined relation before the table exists
    let err = driver
        .query(&mut client, &format!("SELECT * FROM {table}"), &[])
        .await
        .unwrap_err();
    assert_eq!(err.sql_state(), Some("42P01"));

    driver.ensure_migrations_table(&table).await.unwrap();

    let rows = driver
        .query(&mut client, &format!("SELECT * FROM {table}"), &[])
        .await
        .unwrap();
    assert!(rows.is_empty());

    driver
        .exec(&mut client, &format!("DROP TABLE {table}"), &[])
        .await
        .unwrap();
    driver.release_client(client).await;
    driver.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_ensure_is_idempotent_and_preserves_contents() {
    let Some(config) = common::test_config() else {
        eprintln!("Skipping test: DB_NAME / DB_USER not set");
        return;
    };
    let driver = PgDriver::new(config);
    driver.initialize().await.unwrap();

    let table = common::unique_table("migs");
    driver.ensure_migrations_table(&table).await.unwrap();

    let mut client = driver.get_client().await.unwrap();
    driver
        .exec(
            &mut client,
            &format!("INSERT INTO {table}(name, updated_at) VALUES($1, $2::timestamp)"),
            &[
                SqlParam::String("001-init".to_string()),
                SqlParam::String(driver.date_iso(Utc::now())),
            ],
        )
        .await
        .unwrap();

    // A second ensure neither errors nor touches existing rows
    driver.ensure_migrations_table(&table).await.unwrap();

    let names = driver.list_executed_migration_names(&table).await.unwrap();
    assert_eq!(names, vec!["001-init".to_string()]);

    driver
        .exec(&mut client, &format!("DROP TABLE {table}"), &[])
        .await
        .unwrap();
    driver.release_client(client).await;
    driver.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_list_returns_names_in_ascending_order() {
    let Some(config) = common::test_config() else {
        eprintln!("Skipping test: DB_NAME / DB_USER not set");
        return;
    };
    let driver = PgDriver::new(config);
    driver.initialize().await.unwrap();

    let table = common::unique_table("migs");
    driver.ensure_migrations_table(&table).await.unwrap();
    assert!(
        driver
            .list_executed_migration_names(&table)
            .await
            .unwrap()
            .is_empty()
    );

    let mut client = driver.get_client().await.unwrap();
    // Insert out of order; listing sorts by name
    driver
        .exec(
            &mut client,
            &format!(
                "INSERT INTO {table}(name, updated_at) \
                 VALUES('002-blah', $1::timestamp),('001-init', $2::timestamp)"
            ),
            &[
                SqlParam::String(driver.date_iso(Utc::now())),
                SqlParam::String(driver.date_iso(Utc::now())),
            ],
        )
        .await
        .unwrap();

    let names = driver.list_executed_migration_names(&table).await.unwrap();
    assert_eq!(
        names,
        vec!["001-init".to_string(), "002-blah".to_string()]
    );

    driver
        .exec(&mut client, &format!("DROP TABLE {table}"), &[])
        .await
        .unwrap();
    driver.release_client(client).await;
    driver.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_log_migration_successful_records_names() {
    let Some(config) = common::test_config() else {
        eprintln!("Skipping test: DB_NAME / DB_USER not set");
        return;
    };
    let driver = PgDriver::new(config);
    driver.initialize().await.unwrap();

    let table = common::unique_table("migs");
    driver.ensure_migrations_table(&table).await.unwrap();

    let mut client = driver.get_client().await.unwrap();
    {
        let mut conn = DriverConn::new(&driver, &mut client);
        driver
            .log_migration_successful(&mut conn, &table, "1-mig")
            .await
            .unwrap();
        driver
            .log_migration_successful(&mut conn, &table, "2-mig")
            .await
            .unwrap();
    }

    let names = driver.list_executed_migration_names(&table).await.unwrap();
    assert_eq!(names, vec!["1-mig".to_string(), "2-mig".to_string()]);

    driver
        .exec(&mut client, &format!("DROP TABLE {table}"), &[])
        .await
        .unwrap();
    driver.release_client(client).await;
    driver.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_migration_isolation_level_is_fixed() {
    // Pure policy, no database needed
    let driver = PgDriver::new(sqldb_pg::PgConfig::default());
    assert_eq!(driver.migration_tx_isolation_level(), "rr");
}
