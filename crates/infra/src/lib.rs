//! # calsync Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite event and account stores
//! - Google Calendar events client, OAuth client and webhook registrar
//! - Configuration loading
//! - The cron-based sync scheduler
//!
//! ## Architecture
//! - Implements traits defined in `calsync-core`
//! - Contains all "impure" code (I/O, HTTP, clocks)

pub mod config;
pub mod database;
pub mod errors;
pub mod integrations;
pub mod scheduling;

// Re-export commonly used items
pub use database::{DbManager, SqliteAccountStore, SqliteEventStore};
pub use errors::InfraError;
pub use integrations::google::{GoogleCalendarClient, GoogleOAuthClient, GoogleWebhookRegistrar};
pub use scheduling::{BatchOutcome, SchedulerError, SyncScheduler, SyncSchedulerConfig};
