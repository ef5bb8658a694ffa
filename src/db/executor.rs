//! Statement execution and result normalization.
//!
//! Row-returning and row-count-only statements are normalized into one
//! shape: a sequence whose length is the engine-reported affected-row count.
//! Rows the engine counted but returned no column data for (INSERT, UPDATE,
//! DELETE without RETURNING) appear as explicit `None` entries, so callers
//! can read "rows affected" off the sequence length uniformly.

use crate::db::params::{SqlParam, bind_param};
use crate::db::types::{Row, RowToJson};
use crate::error::DriverResult;
use futures_util::TryStreamExt;
use sqlx::{Either, Executor, PgConnection};
use tracing::debug;

/// Execute a statement and return its normalized row sequence.
///
/// Any error reported by the engine is propagated unchanged; nothing is
/// retried or translated at this layer.
pub(crate) async fn query(
    conn: &mut PgConnection,
    sql: &str,
    params: &[SqlParam],
) -> DriverResult<Vec<Option<Row>>> {
    debug!(sql = %sql, params = params.len(), "executing statement");

    // Without parameters, go through the simple query protocol. This avoids
    // preparing statements that cannot be prepared and permits
    // multi-statement strings.
    let mut stream = if params.is_empty() {
        conn.fetch_many(sql)
    } else {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, param);
        }
        query.fetch_many(conn)
    };

    let mut affected: u64 = 0;
    let mut rows: Vec<Option<Row>> = Vec::new();
    while let Some(step) = stream.try_next().await? {
        match step {
            Either::Left(done) => affected += done.rows_affected(),
            Either::Right(row) => rows.push(Some(row.to_json_map())),
        }
    }

    Ok(normalize_rows(rows, affected))
}

/// Execute a statement and return the number of rows it affected.
pub(crate) async fn exec(
    conn: &mut PgConnection,
    sql: &str,
    params: &[SqlParam],
) -> DriverResult<usize> {
    Ok(query(conn, sql, params).await?.len())
}

/// Reconcile decoded rows with the reported affected-row count.
///
/// The count and the row data can diverge depending on statement type, so
/// the count wins: zero means an empty result regardless of decoded rows,
/// and a surplus is padded with the absence marker.
fn normalize_rows(mut rows: Vec<Option<Row>>, affected: u64) -> Vec<Option<Row>> {
    if affected == 0 {
        return Vec::new();
    }
    while rows.len() < affected as usize {
        rows.push(None);
    }
    rows
}
