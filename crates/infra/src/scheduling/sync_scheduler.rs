//! Periodic "synchronize every account" scheduler.
//!
//! Cron-based: each tick runs `CalendarService::synchronize_all` under a job
//! timeout. Lifecycle is explicit (`start`/`stop`), every scheduler operation
//! is wrapped in a timeout, and `stop` cancels a batch that is still running
//! through a `CancellationToken`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use calsync_core::{BatchSyncReport, CalendarService};
use calsync_domain::{CalSyncError, SyncConfig};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the sync scheduler.
#[derive(Debug, Clone)]
pub struct SyncSchedulerConfig {
    /// Six-field cron expression describing the execution schedule.
    pub cron_expression: String,
    /// Timeout applied to one batch run.
    pub job_timeout: Duration,
    pub start_timeout: Duration,
    pub stop_timeout: Duration,
}

impl Default for SyncSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: "0 */15 * * * *".into(), // every 15 minutes
            job_timeout: Duration::from_secs(300),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&SyncConfig> for SyncSchedulerConfig {
    fn from(sync: &SyncConfig) -> Self {
        Self {
            cron_expression: sync.cron_expression.clone(),
            job_timeout: Duration::from_secs(sync.job_timeout_seconds),
            ..Self::default()
        }
    }
}

/// How one batch run ended
#[derive(Debug)]
pub enum BatchOutcome {
    Completed(BatchSyncReport),
    /// The account list could not be read
    Failed(CalSyncError),
    TimedOut,
    /// The scheduler was stopped while the batch was running
    Cancelled,
}

/// Sync scheduler with explicit lifecycle management.
pub struct SyncScheduler {
    scheduler: Option<JobScheduler>,
    config: SyncSchedulerConfig,
    cancellation: CancellationToken,
    service: Arc<CalendarService>,
}

impl SyncScheduler {
    pub fn new(config: SyncSchedulerConfig, service: Arc<CalendarService>) -> Self {
        Self { scheduler: None, config, cancellation: CancellationToken::new(), service }
    }

    /// Start the scheduler and register the cron job.
    #[instrument(skip(self), fields(cron = %self.config.cron_expression))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: start_timeout.as_secs() })?
            .map_err(|e| SchedulerError::StartFailed(e.to_string()))?;

        self.scheduler = Some(scheduler_instance);

        info!("Sync scheduler started");
        Ok(())
    }

    /// Stop the scheduler, cancelling any batch still in flight.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let Some(mut scheduler) = self.scheduler.take() else {
            return Err(SchedulerError::NotRunning);
        };

        self.cancellation.cancel();

        let stop_timeout = self.config.stop_timeout;
        tokio::time::timeout(stop_timeout, scheduler.shutdown())
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: stop_timeout.as_secs() })?
            .map_err(|e| SchedulerError::StopFailed(e.to_string()))?;

        info!("Sync scheduler stopped");
        Ok(())
    }

    /// Returns true when a scheduler instance is active.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Run one batch immediately, outside the cron schedule.
    pub async fn run_once(&self) -> BatchOutcome {
        Self::run_batch(self.service.clone(), self.config.job_timeout, self.cancellation.clone())
            .await
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler =
            JobScheduler::new().await.map_err(|e| SchedulerError::CreationFailed(e.to_string()))?;
        let service = self.service.clone();
        let job_timeout = self.config.job_timeout;
        let cancel = self.cancellation.clone();

        let job = Job::new_async(self.config.cron_expression.as_str(), move |_id, _lock| {
            let service = service.clone();
            let cancel = cancel.clone();
            Box::pin(async move {
                Self::run_batch(service, job_timeout, cancel).await;
            })
        })
        .map_err(|e| SchedulerError::JobRegistrationFailed(e.to_string()))?;

        let job_id = job.guid();
        scheduler
            .add(job)
            .await
            .map_err(|e| SchedulerError::JobRegistrationFailed(e.to_string()))?;

        debug!(cron = %self.config.cron_expression, %job_id, "Registered sync job");
        Ok(scheduler)
    }

    async fn run_batch(
        service: Arc<CalendarService>,
        job_timeout: Duration,
        cancel: CancellationToken,
    ) -> BatchOutcome {
        let started = Instant::now();

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(elapsed_ms = started.elapsed().as_millis(), "Scheduled sync cancelled");
                BatchOutcome::Cancelled
            }
            result = tokio::time::timeout(job_timeout, service.synchronize_all()) => match result {
                Ok(Ok(report)) => {
                    debug!(
                        accounts = report.accounts_total,
                        failed = report.failure_count(),
                        elapsed_ms = started.elapsed().as_millis(),
                        "Scheduled sync finished"
                    );
                    BatchOutcome::Completed(report)
                }
                Ok(Err(err)) => {
                    error!(error = %err, "Scheduled sync could not list accounts");
                    BatchOutcome::Failed(err)
                }
                Err(_) => {
                    warn!(timeout_secs = job_timeout.as_secs(), "Scheduled sync timed out");
                    BatchOutcome::TimedOut
                }
            },
        }
    }
}
