//! SQLite implementation of the `AccountStore` port.

use std::sync::Arc;

use async_trait::async_trait;
use calsync_core::AccountStore;
use calsync_domain::{CalSyncError, CalendarAccount, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;
use tracing::{debug, info, instrument};

use super::event_repository::timestamp_to_utc;
use super::pool::SqlitePool;
use crate::errors::conversions::{map_join_error, map_pool_error, map_sql_error};

const ACCOUNT_COLUMNS: &str =
    "account_id, primary_email, refresh_token, sync_token, webhook_registered_at";

/// SQLite implementation of `AccountStore`
pub struct SqliteAccountStore {
    pool: Arc<SqlitePool>,
}

impl SqliteAccountStore {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Run `work` with a pooled connection on the blocking thread pool.
    async fn with_connection<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let pool = Arc::clone(&self.pool);
        task::spawn_blocking(move || -> Result<T> {
            let conn = pool.get().map_err(map_pool_error)?;
            work(&*conn)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_account(row: &Row<'_>) -> rusqlite::Result<(CalendarAccount, Option<i64>)> {
    let account = CalendarAccount {
        account_id: row.get(0)?,
        primary_email: row.get(1)?,
        refresh_token: row.get(2)?,
        sync_token: row.get(3)?,
        webhook_registered_at: None,
    };
    Ok((account, row.get(4)?))
}

fn finish_account((mut account, registered): (CalendarAccount, Option<i64>)) -> Result<CalendarAccount> {
    account.webhook_registered_at = registered.map(timestamp_to_utc).transpose()?;
    Ok(account)
}

fn ensure_updated(rows: usize, account_id: &str) -> Result<()> {
    if rows == 0 {
        return Err(CalSyncError::UnauthorizedAccount(account_id.to_string()));
    }
    Ok(())
}

fn query_account(conn: &Connection, account_id: &str) -> Result<Option<CalendarAccount>> {
    let found = conn
        .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM calendar_account WHERE account_id = ?1"),
            params![account_id],
            map_account,
        )
        .optional()
        .map_err(map_sql_error)?;

    found.map(finish_account).transpose()
}

fn query_all_accounts(conn: &Connection) -> Result<Vec<CalendarAccount>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {ACCOUNT_COLUMNS} FROM calendar_account ORDER BY account_id"))
        .map_err(map_sql_error)?;

    let rows = stmt
        .query_map([], map_account)
        .map_err(map_sql_error)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(map_sql_error)?;

    rows.into_iter().map(finish_account).collect()
}

fn upsert_account(conn: &Connection, account: &CalendarAccount) -> Result<()> {
    conn.execute(
        "INSERT INTO calendar_account (
            account_id, primary_email, refresh_token, sync_token,
            webhook_registered_at, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
        ON CONFLICT(account_id) DO UPDATE SET
            primary_email = excluded.primary_email,
            refresh_token = excluded.refresh_token,
            sync_token = excluded.sync_token,
            webhook_registered_at = excluded.webhook_registered_at,
            updated_at = excluded.updated_at",
        params![
            account.account_id,
            account.primary_email,
            account.refresh_token,
            account.sync_token,
            account.webhook_registered_at.map(|at| at.timestamp()),
            Utc::now().timestamp(),
        ],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    #[instrument(skip(self))]
    async fn find(&self, account_id: &str) -> Result<Option<CalendarAccount>> {
        let account_id = account_id.to_string();
        self.with_connection(move |conn| query_account(conn, &account_id)).await
    }

    #[instrument(skip(self))]
    async fn update_cursor(&self, account_id: &str, cursor: Option<&str>) -> Result<()> {
        let owned_id = account_id.to_string();
        let owned_cursor = cursor.map(str::to_string);

        let rows = self
            .with_connection(move |conn| {
                conn.execute(
                    "UPDATE calendar_account SET sync_token = ?1, updated_at = ?2 WHERE account_id = ?3",
                    params![owned_cursor, Utc::now().timestamp(), owned_id],
                )
                .map_err(map_sql_error)
            })
            .await?;

        ensure_updated(rows, account_id)?;
        debug!(account_id, cleared = cursor.is_none(), "sync cursor updated");
        Ok(())
    }

    #[instrument(skip(self, account), fields(account_id = %account.account_id))]
    async fn upsert(&self, account: &CalendarAccount) -> Result<()> {
        let owned = account.clone();
        self.with_connection(move |conn| upsert_account(conn, &owned)).await?;

        info!(account_id = %account.account_id, "account stored");
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<CalendarAccount>> {
        self.with_connection(query_all_accounts).await
    }

    #[instrument(skip(self))]
    async fn remove(&self, account_id: &str) -> Result<()> {
        let owned_id = account_id.to_string();
        let rows = self
            .with_connection(move |conn| {
                conn.execute("DELETE FROM calendar_account WHERE account_id = ?1", params![owned_id])
                    .map_err(map_sql_error)
            })
            .await?;

        info!(account_id, removed = rows > 0, "account removed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_webhook_registered(&self, account_id: &str, at: DateTime<Utc>) -> Result<()> {
        let owned_id = account_id.to_string();
        let rows = self
            .with_connection(move |conn| {
                conn.execute(
                    "UPDATE calendar_account SET webhook_registered_at = ?1, updated_at = ?2 WHERE account_id = ?3",
                    params![at.timestamp(), Utc::now().timestamp(), owned_id],
                )
                .map_err(map_sql_error)
            })
            .await?;

        ensure_updated(rows, account_id)
    }
}
