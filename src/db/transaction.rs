//! Transaction control.
//!
//! Starting a transaction maps a short isolation code onto the engine's
//! isolation-level name, then issues `BEGIN` followed by `SET TRANSACTION
//! ISOLATION LEVEL`. Commit and rollback are ordinary statements; no extra
//! bookkeeping is kept here. Nested transactions are not supported - what
//! happens when `BEGIN` is issued inside a transaction is the engine's
//! business.

use crate::db::executor;
use crate::error::DriverResult;
use sqlx::PgConnection;

/// Transaction isolation level, keyed by its short code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    /// `rc`
    ReadCommitted,
    /// `rr`
    RepeatableRead,
    /// `ser`
    Serializable,
}

impl IsolationLevel {
    /// Resolve a short isolation code. Unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "rc" => Some(Self::ReadCommitted),
            "rr" => Some(Self::RepeatableRead),
            "ser" => Some(Self::Serializable),
            _ => None,
        }
    }

    /// The short code for this level.
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::ReadCommitted => "rc",
            Self::RepeatableRead => "rr",
            Self::Serializable => "ser",
        }
    }

    /// The engine-level isolation name.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

impl std::fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Begin a transaction at the given isolation level on an acquired client.
pub(crate) async fn begin(conn: &mut PgConnection, level: IsolationLevel) -> DriverResult<()> {
    executor::query(conn, "BEGIN", &[]).await?;
    let set_level = format!("SET TRANSACTION ISOLATION LEVEL {}", level.as_sql());
    executor::query(conn, &set_level, &[]).await?;
    Ok(())
}
