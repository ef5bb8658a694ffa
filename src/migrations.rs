//! Migration bookkeeping SQL.
//!
//! Completed migrations are tracked in a caller-named table of (name,
//! completion timestamp) rows. Table names cannot travel as bind parameters,
//! so they are validated as plain identifiers before interpolation.

use crate::db::transaction::IsolationLevel;
use crate::error::{DriverError, DriverResult};

/// Migrations always run under repeatable-read isolation.
pub const MIGRATION_TX_ISOLATION: IsolationLevel = IsolationLevel::RepeatableRead;

/// Reject table names that are not plain SQL identifiers.
pub(crate) fn check_table_name(table: &str) -> DriverResult<()> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DriverError::config(format!(
            "invalid migrations table name [{table}]"
        )))
    }
}

/// DDL creating the tracking table, a no-op when it already exists.
pub(crate) fn ensure_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table}(name varchar(255) NOT NULL PRIMARY KEY, updated_at timestamp NOT NULL)"
    )
}

/// Completed migration names, ascending.
pub(crate) fn list_names_sql(table: &str) -> String {
    format!("SELECT name FROM {table} ORDER BY name")
}

/// Record one completed migration. The timestamp parameter arrives as
/// ISO 8601 text and is cast by the engine.
pub(crate) fn record_sql(table: &str) -> String {
    format!("INSERT INTO {table}(name, updated_at) VALUES($1, $2::timestamp)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_validation() {
        assert!(check_table_name("migrations").is_ok());
        assert!(check_table_name("_migs_2024").is_ok());

        assert!(check_table_name("").is_err());
        assert!(check_table_name("1migs").is_err());
        assert!(check_table_name("migs; DROP TABLE users").is_err());
        assert!(check_table_name("public.migs").is_err());
    }

    #[test]
    fn test_ensure_table_sql_is_idempotent_ddl() {
        let sql = ensure_table_sql("migs");
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS migs("));
        assert!(sql.contains("name varchar(255) NOT NULL PRIMARY KEY"));
        assert!(sql.contains("updated_at timestamp NOT NULL"));
    }

    #[test]
    fn test_list_orders_by_name() {
        assert_eq!(list_names_sql("migs"), "SELECT name FROM migs ORDER BY name");
    }

    #[test]
    fn test_migration_isolation_policy() {
        assert_eq!(MIGRATION_TX_ISOLATION.as_code(), "rr");
    }
}
