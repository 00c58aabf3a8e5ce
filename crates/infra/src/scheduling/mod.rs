//! Background scheduling

pub mod error;
pub mod sync_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use sync_scheduler::{BatchOutcome, SyncScheduler, SyncSchedulerConfig};
