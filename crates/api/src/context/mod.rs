//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use calsync_core::{CalendarService, SyncOptions, SyncOrchestrator};
use calsync_domain::{CalSyncError, Config, Result};
use calsync_infra::{
    DbManager, GoogleCalendarClient, GoogleOAuthClient, GoogleWebhookRegistrar,
    SqliteAccountStore, SqliteEventStore, SyncScheduler, SyncSchedulerConfig,
};
use tokio::sync::Mutex;
use tracing::info;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub calendar: Arc<CalendarService>,
    scheduler: Mutex<Option<SyncScheduler>>,
}

impl AppContext {
    /// Open the database, apply the schema and wire the Google adapters.
    pub fn new(config: Config) -> Result<Self> {
        let db = Arc::new(DbManager::from_config(&config.database)?);

        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| CalSyncError::Internal(format!("failed to build HTTP client: {e}")))?;

        let oauth = Arc::new(GoogleOAuthClient::new(http.clone(), config.google.clone()));
        let accounts = Arc::new(SqliteAccountStore::new(db.pool().clone()));
        let events = Arc::new(SqliteEventStore::new(db.pool().clone()));
        let source =
            Arc::new(GoogleCalendarClient::new(http.clone(), oauth.clone(), &config.google));
        let webhooks = Arc::new(GoogleWebhookRegistrar::new(http, oauth.clone(), &config.google));

        let orchestrator = SyncOrchestrator::with_options(
            source,
            events,
            accounts.clone(),
            SyncOptions::with_max_pages(config.sync.max_pages),
        );
        let calendar =
            Arc::new(CalendarService::new(Arc::new(orchestrator), accounts, oauth, webhooks));

        info!(
            db_path = %db.path().display(),
            max_pages = ?config.sync.max_pages,
            "application context initialised"
        );

        Ok(Self::from_parts(config, db, calendar))
    }

    /// Assemble a context from already-built services.
    pub fn from_parts(config: Config, db: Arc<DbManager>, calendar: Arc<CalendarService>) -> Self {
        Self { config, db, calendar, scheduler: Mutex::new(None) }
    }

    /// Start the periodic sync scheduler unless it is disabled.
    ///
    /// Returns whether a scheduler is running afterwards.
    pub async fn start_scheduler(&self) -> Result<bool> {
        if !self.config.sync.scheduler_enabled {
            info!("sync scheduler disabled by configuration");
            return Ok(false);
        }

        let mut slot = self.scheduler.lock().await;
        if slot.is_some() {
            return Ok(true);
        }

        let mut scheduler =
            SyncScheduler::new(SyncSchedulerConfig::from(&self.config.sync), self.calendar.clone());
        scheduler.start().await?;
        *slot = Some(scheduler);
        Ok(true)
    }

    /// Stop the scheduler if one is running.
    pub async fn shutdown(&self) -> Result<()> {
        let scheduler = self.scheduler.lock().await.take();
        if let Some(mut scheduler) = scheduler {
            scheduler.stop().await?;
            info!("sync scheduler stopped");
        }
        Ok(())
    }

    /// Upper bound on one webhook-triggered sync pass.
    pub fn sync_timeout(&self) -> Duration {
        Duration::from_secs(self.config.sync.sync_timeout_seconds)
    }
}
