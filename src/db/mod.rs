//! Database access layer.
//!
//! This module provides the adapter's stateful core:
//! - Pool lifecycle with transparent recovery
//! - Checked-out client handles
//! - Active-client accounting
//! - Statement execution and result normalization
//! - Transaction control
//! - Parameter binding and row decoding

pub mod client;
pub mod executor;
pub mod lifecycle;
pub mod params;
pub mod pool;
pub mod transaction;
pub mod types;

pub use client::PgClient;
pub use lifecycle::ClientTracker;
pub use params::SqlParam;
pub use pool::PoolManager;
pub use transaction::IsolationLevel;
pub use types::{Row, RowToJson};
