//! PostgreSQL driver adapter.
//!
//! This library exposes a uniform driver contract over PostgreSQL:
//! connection lifecycle (pooled or single-connection) with transparent
//! pool recovery, query-result normalization, transaction isolation
//! control, and migration bookkeeping.

pub mod config;
pub mod db;
pub mod driver;
pub mod error;
pub mod migrations;
pub mod postgres;

pub use config::PgConfig;
pub use db::{IsolationLevel, PgClient, Row, SqlParam};
pub use driver::{DriverConn, MigrationConn, SqlDriver};
pub use error::{DriverError, DriverResult};
pub use postgres::PgDriver;
