//! SQLite connection pool helpers
//!
//! Thin wrapper around an r2d2 pool of rusqlite connections that converts
//! pool errors into the domain error type used by infrastructure code.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use calsync_domain::Result as DomainResult;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;

use crate::errors::conversions::map_pool_error;

/// Shared pool type used by every SQLite adapter.
pub type SqlitePool = r2d2::Pool<SqliteConnectionManager>;

/// Pooled connection handed out by [`SqlitePool`].
pub type SqliteConnection = PooledConnection<SqliteConnectionManager>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create an `Arc<SqlitePool>` for the database at `path`.
///
/// Every connection enables foreign keys and waits on a busy database.
pub fn create_sqlite_pool<P: AsRef<Path>>(path: P, max_size: u32) -> DomainResult<Arc<SqlitePool>> {
    let manager = SqliteConnectionManager::file(path.as_ref()).with_init(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    });

    r2d2::Pool::builder()
        .max_size(max_size.max(1))
        .build(manager)
        .map(Arc::new)
        .map_err(map_pool_error)
}
