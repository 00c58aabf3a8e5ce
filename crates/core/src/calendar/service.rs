//! Calendar service: authorization, webhook registration and synchronization
//! use cases on top of the sync orchestrator.

use std::sync::Arc;

use calsync_domain::{CalSyncError, CalendarAccount, Result, SyncSummary, WebhookChannel};
use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::calendar_ports::{AuthorizationProvider, WebhookRegistrar};
use crate::sync::locks::AccountLocks;
use crate::sync::orchestrator::SyncOrchestrator;
use crate::sync::ports::AccountStore;

/// Outcome of a "synchronize every account" run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSyncReport {
    pub accounts_total: usize,
    pub succeeded: usize,
    /// `(account_id, error label)` of each failed pass
    pub failed: Vec<(String, String)>,
}

impl BatchSyncReport {
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }
}

/// Calendar use-case service
pub struct CalendarService {
    orchestrator: Arc<SyncOrchestrator>,
    accounts: Arc<dyn AccountStore>,
    authorization: Arc<dyn AuthorizationProvider>,
    webhooks: Arc<dyn WebhookRegistrar>,
    locks: AccountLocks,
}

impl CalendarService {
    pub fn new(
        orchestrator: Arc<SyncOrchestrator>,
        accounts: Arc<dyn AccountStore>,
        authorization: Arc<dyn AuthorizationProvider>,
        webhooks: Arc<dyn WebhookRegistrar>,
    ) -> Self {
        Self { orchestrator, accounts, authorization, webhooks, locks: AccountLocks::new() }
    }

    /// Per-account lock registry used by [`Self::synchronize`]
    pub fn locks(&self) -> &AccountLocks {
        &self.locks
    }

    /// URL the user opens to grant calendar access
    pub fn authorization_url(&self) -> Result<String> {
        self.authorization.authorization_url()
    }

    /// Exchange `code`, store the account (resetting its cursor) and register
    /// its webhook channel.
    #[instrument(skip(self, code))]
    pub async fn authorize_account(&self, code: &str) -> Result<CalendarAccount> {
        if code.trim().is_empty() {
            return Err(CalSyncError::InvalidInput("authorization code is empty".to_string()));
        }

        let mut account = self.authorization.authorize(code).await?;
        account.sync_token = None;
        self.accounts.upsert(&account).await?;
        info!(account_id = %account.account_id, email = %account.primary_email, "account authorized");

        self.register_webhook(&account.account_id).await?;
        Ok(self.accounts.find(&account.account_id).await?.unwrap_or(account))
    }

    /// Register a push channel for the account's primary calendar.
    #[instrument(skip(self))]
    pub async fn register_webhook(&self, account_id: &str) -> Result<WebhookChannel> {
        let account = self
            .accounts
            .find(account_id)
            .await?
            .ok_or_else(|| CalSyncError::UnauthorizedAccount(account_id.to_string()))?;

        let channel = self.webhooks.register_webhook(&account).await?;
        self.accounts.mark_webhook_registered(account_id, Utc::now()).await?;
        info!(account_id, channel_id = %channel.channel_id, expires_at = %channel.expires_at, "webhook registered");
        Ok(channel)
    }

    /// Run one sync pass while holding the account's lock.
    ///
    /// An invalidated cursor is cleared before the error is returned, so the
    /// next pass performs a windowed full fetch.
    #[instrument(skip(self))]
    pub async fn synchronize(&self, account_id: &str) -> Result<SyncSummary> {
        // Unknown ids never reach the lock registry.
        if self.accounts.find(account_id).await?.is_none() {
            return Err(CalSyncError::UnauthorizedAccount(account_id.to_string()));
        }
        let _guard = self.locks.acquire(account_id).await;

        match self.orchestrator.run_sync(account_id).await {
            Err(err @ CalSyncError::SyncCursorInvalidated(_)) => {
                warn!(account_id, error = %err, "sync cursor rejected, clearing it for a full resync");
                self.accounts.update_cursor(account_id, None).await?;
                Err(err)
            }
            other => other,
        }
    }

    /// Synchronize every stored account sequentially, continuing past failures.
    #[instrument(skip(self))]
    pub async fn synchronize_all(&self) -> Result<BatchSyncReport> {
        let accounts = self.accounts.list_all().await?;
        let mut report = BatchSyncReport { accounts_total: accounts.len(), ..BatchSyncReport::default() };

        for account in accounts {
            match self.synchronize(&account.account_id).await {
                Ok(_) => report.succeeded += 1,
                Err(err) => {
                    error!(account_id = %account.account_id, error = %err, kind = err.label(), "account sync failed");
                    report.failed.push((account.account_id, err.label().to_string()));
                }
            }
        }

        info!(
            accounts = report.accounts_total,
            succeeded = report.succeeded,
            failed = report.failure_count(),
            "batch sync complete"
        );
        Ok(report)
    }
}
