//! In-memory mocks for the storage ports.
//!
//! Both stores record every successful write so tests can assert on ordering
//! and on the absence of writes after a failed pass. Individual operations
//! can be switched to fail with `CalSyncError::Store`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use calsync_core::{AccountStore, LocalEventStore};
use calsync_domain::{CalSyncError, CalendarAccount, CalendarEvent, Result as DomainResult};
use chrono::{DateTime, Utc};

/// Write operations observed by the mocks, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    ReplaceEvents { account_id: String, count: usize },
    UpdateCursor { account_id: String, cursor: Option<String> },
}

/// Shared write journal so both stores log into one sequence
pub type Journal = Arc<Mutex<Vec<Write>>>;

#[derive(Default, Clone)]
pub struct InMemoryEventStore {
    events: Arc<Mutex<HashMap<String, Vec<CalendarEvent>>>>,
    journal: Journal,
    reads: Arc<Mutex<usize>>,
    failing_reads: Arc<Mutex<bool>>,
    failing_replace: Arc<Mutex<bool>>,
}

impl InMemoryEventStore {
    pub fn new(journal: Journal) -> Self {
        Self { journal, ..Self::default() }
    }

    pub fn seed(&self, account_id: &str, events: Vec<CalendarEvent>) {
        self.events.lock().unwrap().insert(account_id.to_string(), events);
    }

    pub fn stored(&self, account_id: &str) -> Vec<CalendarEvent> {
        self.events.lock().unwrap().get(account_id).cloned().unwrap_or_default()
    }

    pub fn read_count(&self) -> usize {
        *self.reads.lock().unwrap()
    }

    pub fn fail_reads(&self, fail: bool) {
        *self.failing_reads.lock().unwrap() = fail;
    }

    pub fn fail_replace(&self, fail: bool) {
        *self.failing_replace.lock().unwrap() = fail;
    }
}

#[async_trait]
impl LocalEventStore for InMemoryEventStore {
    async fn read_all(&self, account_id: &str) -> DomainResult<Vec<CalendarEvent>> {
        *self.reads.lock().unwrap() += 1;
        if *self.failing_reads.lock().unwrap() {
            return Err(CalSyncError::Store("event table unavailable".into()));
        }
        Ok(self.stored(account_id))
    }

    async fn replace_all(&self, account_id: &str, events: &[CalendarEvent]) -> DomainResult<()> {
        if *self.failing_replace.lock().unwrap() {
            return Err(CalSyncError::Store("disk full".into()));
        }
        self.journal.lock().unwrap().push(Write::ReplaceEvents {
            account_id: account_id.to_string(),
            count: events.len(),
        });
        self.events.lock().unwrap().insert(account_id.to_string(), events.to_vec());
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<Mutex<HashMap<String, CalendarAccount>>>,
    journal: Journal,
    failing_cursor_update: Arc<Mutex<bool>>,
}

impl InMemoryAccountStore {
    pub fn new(journal: Journal) -> Self {
        Self { journal, ..Self::default() }
    }

    pub fn with_account(self, account: CalendarAccount) -> Self {
        self.accounts.lock().unwrap().insert(account.account_id.clone(), account);
        self
    }

    /// Seed an account without going through the async port.
    pub fn upsert_sync(&self, account: CalendarAccount) {
        self.accounts.lock().unwrap().insert(account.account_id.clone(), account);
    }

    pub fn get(&self, account_id: &str) -> Option<CalendarAccount> {
        self.accounts.lock().unwrap().get(account_id).cloned()
    }

    pub fn fail_cursor_updates(&self, fail: bool) {
        *self.failing_cursor_update.lock().unwrap() = fail;
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find(&self, account_id: &str) -> DomainResult<Option<CalendarAccount>> {
        Ok(self.get(account_id))
    }

    async fn update_cursor(&self, account_id: &str, cursor: Option<&str>) -> DomainResult<()> {
        if *self.failing_cursor_update.lock().unwrap() {
            return Err(CalSyncError::Store("account table locked".into()));
        }
        self.journal.lock().unwrap().push(Write::UpdateCursor {
            account_id: account_id.to_string(),
            cursor: cursor.map(str::to_string),
        });
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(account_id)
            .ok_or_else(|| CalSyncError::Store(format!("no account {account_id}")))?;
        account.sync_token = cursor.map(str::to_string);
        Ok(())
    }

    async fn upsert(&self, account: &CalendarAccount) -> DomainResult<()> {
        self.accounts.lock().unwrap().insert(account.account_id.clone(), account.clone());
        Ok(())
    }

    async fn list_all(&self) -> DomainResult<Vec<CalendarAccount>> {
        let mut accounts: Vec<_> = self.accounts.lock().unwrap().values().cloned().collect();
        accounts.sort_by(|a, b| a.account_id.cmp(&b.account_id));
        Ok(accounts)
    }

    async fn remove(&self, account_id: &str) -> DomainResult<()> {
        self.accounts.lock().unwrap().remove(account_id);
        Ok(())
    }

    async fn mark_webhook_registered(&self, account_id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        if let Some(account) = self.accounts.lock().unwrap().get_mut(account_id) {
            account.webhook_registered_at = Some(at);
        }
        Ok(())
    }
}
