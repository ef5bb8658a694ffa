//! Connection pool lifecycle.
//!
//! The pool slot moves through Absent -> Created -> Destroyed -> Created...
//! At most one live pool exists at a time; destruction always precedes the
//! creation of its replacement. A failed checkout triggers one transparent
//! destroy-and-recreate cycle before the failure surfaces: a broken pool
//! (database restart) is the dominant recoverable failure, while persistent
//! failures (bad credentials, network partition) must surface immediately.

use crate::config::PgConfig;
use crate::db::client::PgClient;
use crate::db::lifecycle::ClientTracker;
use crate::error::{DriverError, DriverResult};
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPoolOptions, Postgres};
use sqlx::{Connection, PgPool};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// The single pool slot plus a generation stamp.
///
/// The generation deduplicates recovery: a caller that observed generation G
/// only rebuilds the pool if the slot is still at G. Otherwise another
/// caller already recovered it and the borrow is simply retried against the
/// replacement.
#[derive(Default)]
struct PoolSlot {
    pool: Option<PgPool>,
    generation: u64,
}

/// Owns the optional pooled resource and the checkout/release operations.
pub struct PoolManager {
    config: PgConfig,
    slot: RwLock<PoolSlot>,
    tracker: Arc<ClientTracker>,
}

impl PoolManager {
    pub fn new(config: PgConfig, tracker: Arc<ClientTracker>) -> Self {
        Self {
            config,
            slot: RwLock::new(PoolSlot::default()),
            tracker,
        }
    }

    /// Create the pool if pooling is enabled. No-op otherwise, and when a
    /// pool already exists.
    pub async fn initialize(&self) {
        if !self.config.pooling_enabled() {
            return;
        }
        let mut slot = self.slot.write().await;
        if slot.pool.is_none() {
            slot.pool = Some(self.build_pool());
        }
    }

    /// Allocate the pooled resource.
    ///
    /// The pool is built lazily: no connection is opened here, so failures
    /// surface at checkout where the recovery policy lives. Broken idle
    /// connections are discarded and replaced by the pool itself; they are
    /// never attributed to an in-flight caller.
    fn build_pool(&self) -> PgPool {
        let max_connections = self.config.pool_size_or_default();
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(self.config.client_idle_timeout_or_default())
            .acquire_timeout(self.config.acquire_timeout_or_default())
            .test_before_acquire(true)
            .connect_lazy_with(self.config.connect_options());

        info!(max_connections, "created Postgres connection pool");
        pool
    }

    /// Whether a live pool currently exists.
    pub async fn has_pool(&self) -> bool {
        self.slot.read().await.pool.is_some()
    }

    async fn current(&self) -> Option<(PgPool, u64)> {
        let slot = self.slot.read().await;
        slot.pool.clone().map(|pool| (pool, slot.generation))
    }

    /// Tear down the pool: log the active-client count, clear the slot,
    /// then close all underlying connections and wait for completion.
    /// Calling this when no pool exists is a no-op.
    pub async fn destroy(&self) {
        let pool = {
            let mut slot = self.slot.write().await;
            slot.pool.take()
        };
        if let Some(pool) = pool {
            info!(
                active_clients = self.tracker.count(),
                "destroying Postgres connection pool"
            );
            pool.close().await;
        }
    }

    /// Destroy then recreate the pool, as a recovery action.
    ///
    /// Recreation is serialized behind the slot's write lock and skipped
    /// entirely if the generation moved past `seen_generation`, so
    /// concurrent callers hitting the same broken pool trigger exactly one
    /// rebuild between them.
    async fn recreate(&self, seen_generation: u64) {
        let mut slot = self.slot.write().await;
        if slot.generation != seen_generation {
            debug!("pool already recreated by a concurrent caller");
            return;
        }
        if let Some(pool) = slot.pool.take() {
            info!(
                active_clients = self.tracker.count(),
                "destroying Postgres connection pool"
            );
            pool.close().await;
        }
        slot.pool = Some(self.build_pool());
        slot.generation += 1;
    }

    /// Check a client out of the pool.
    ///
    /// On the first failure the pool is recreated and the borrow retried
    /// exactly once; a failure of the retried attempt propagates.
    pub async fn acquire(&self) -> DriverResult<PoolConnection<Postgres>> {
        let Some((pool, generation)) = self.current().await else {
            return Err(DriverError::internal("no active connection pool"));
        };

        match pool.acquire().await {
            Ok(conn) => {
                self.tracker.checkout();
                Ok(conn)
            }
            Err(err) => {
                warn!(
                    error = %err,
                    "error fetching client from pool, will recreate the pool and retry"
                );
                self.recreate(generation).await;

                let Some((pool, _)) = self.current().await else {
                    return Err(DriverError::internal("no active connection pool"));
                };
                match pool.acquire().await {
                    Ok(conn) => {
                        self.tracker.checkout();
                        Ok(conn)
                    }
                    Err(err) => {
                        error!(error = %err, "error fetching client from pool");
                        Err(err.into())
                    }
                }
            }
        }
    }

    /// Hand a client back. The counter is decremented on every release
    /// attempt; a failure while returning or closing the underlying
    /// connection is swallowed, since the caller is already done with it.
    pub async fn release(&self, client: PgClient) {
        self.tracker.checkin();
        match client {
            // Dropping the handle returns the connection to its pool; the
            // pool discards it instead if it is no longer usable.
            PgClient::Pooled(conn) => drop(conn),
            PgClient::Direct(conn) => {
                if let Err(err) = conn.close().await {
                    debug!(error = %err, "error closing standalone client");
                }
            }
        }
    }

    #[cfg(test)]
    async fn generation(&self) -> u64 {
        self.slot.read().await.generation
    }
}
