//! Checked-out client handles.

use sqlx::PgConnection;
use sqlx::pool::PoolConnection;
use sqlx::postgres::Postgres;

/// One checked-out connection, exclusively owned by the caller until it is
/// handed back through `release_client`.
///
/// A pooled client returns to the pool on release; a direct client is a
/// standalone connection that is closed instead.
pub enum PgClient {
    Pooled(PoolConnection<Postgres>),
    Direct(PgConnection),
}

impl PgClient {
    /// Whether this client was borrowed from a pool.
    pub fn is_pooled(&self) -> bool {
        matches!(self, PgClient::Pooled(_))
    }

    /// The underlying connection, for statement execution.
    pub(crate) fn conn(&mut self) -> &mut PgConnection {
        match self {
            PgClient::Pooled(conn) => &mut **conn,
            PgClient::Direct(conn) => conn,
        }
    }
}

impl std::fmt::Debug for PgClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PgClient::Pooled(_) => f.write_str("PgClient::Pooled"),
            PgClient::Direct(_) => f.write_str("PgClient::Direct"),
        }
    }
}
