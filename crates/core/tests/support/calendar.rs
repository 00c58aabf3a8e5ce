//! Mocks for the remote calendar ports.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use calsync_core::{AuthorizationProvider, RemoteEventSource, WebhookRegistrar};
use calsync_domain::{
    CalSyncError, CalendarAccount, Result as DomainResult, SyncBatch, WebhookChannel,
};
use chrono::{Duration, Utc};

/// Arguments of one `fetch_delta` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    pub account_id: String,
    pub sync_cursor: Option<String>,
    pub page_token: Option<String>,
}

/// Remote source that replays a scripted sequence of responses.
///
/// Each call pops the next response; running out of script is reported as a
/// remote fetch error.
#[derive(Default, Clone)]
pub struct ScriptedEventSource {
    responses: Arc<Mutex<VecDeque<DomainResult<SyncBatch>>>>,
    calls: Arc<Mutex<Vec<FetchCall>>>,
}

impl ScriptedEventSource {
    pub fn new(responses: Vec<DomainResult<SyncBatch>>) -> Self {
        Self { responses: Arc::new(Mutex::new(responses.into())), calls: Arc::default() }
    }

    /// Endless source returning the same continuation page forever.
    pub fn never_finishing() -> Self {
        let pages = (0..64).map(|i| Ok(super::page(Vec::new(), &format!("p{i}")))).collect();
        Self::new(pages)
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteEventSource for ScriptedEventSource {
    async fn fetch_delta(
        &self,
        account: &CalendarAccount,
        sync_cursor: Option<&str>,
        page_token: Option<&str>,
    ) -> DomainResult<SyncBatch> {
        self.calls.lock().unwrap().push(FetchCall {
            account_id: account.account_id.clone(),
            sync_cursor: sync_cursor.map(str::to_string),
            page_token: page_token.map(str::to_string),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CalSyncError::RemoteFetch("script exhausted".to_string())))
    }
}

/// Authorization provider that returns a preset account for any code.
#[derive(Clone)]
pub struct StaticAuthorizationProvider {
    pub account: CalendarAccount,
    pub fail_with: Option<CalSyncError>,
}

impl StaticAuthorizationProvider {
    pub fn new(account: CalendarAccount) -> Self {
        Self { account, fail_with: None }
    }
}

#[async_trait]
impl AuthorizationProvider for StaticAuthorizationProvider {
    fn authorization_url(&self) -> DomainResult<String> {
        Ok("https://accounts.example.com/auth?client_id=test".to_string())
    }

    async fn authorize(&self, _code: &str) -> DomainResult<CalendarAccount> {
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(self.account.clone()),
        }
    }
}

/// Webhook registrar that records which accounts it registered.
#[derive(Default, Clone)]
pub struct RecordingWebhookRegistrar {
    registered: Arc<Mutex<Vec<String>>>,
}

impl RecordingWebhookRegistrar {
    pub fn registered(&self) -> Vec<String> {
        self.registered.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebhookRegistrar for RecordingWebhookRegistrar {
    async fn register_webhook(&self, account: &CalendarAccount) -> DomainResult<WebhookChannel> {
        self.registered.lock().unwrap().push(account.account_id.clone());
        Ok(WebhookChannel {
            channel_id: format!("channel-{}", account.account_id),
            address: format!("https://calsync.test/google-calendar/{}/events/update", account.account_id),
            expires_at: Utc::now() + Duration::days(30),
        })
    }
}
