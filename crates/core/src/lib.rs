//! # calsync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the remote event source, the local
//!   event store, the account store, authorization and webhook registration
//! - The merge policy and the sync orchestrator
//! - The calendar use-case service
//!
//! ## Architecture Principles
//! - Only depends on `calsync-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod calendar;
pub mod calendar_ports;
pub mod sync;

// Re-export specific items to avoid ambiguity
pub use calendar::{BatchSyncReport, CalendarService};
pub use calendar_ports::{AuthorizationProvider, WebhookRegistrar};
pub use sync::locks::{AccountLockGuard, AccountLocks};
pub use sync::merge::{decide, merge_events, merge_events_with_stats, MergeDecision, MergeStats};
pub use sync::orchestrator::{SyncOptions, SyncOrchestrator};
pub use sync::ports::{AccountStore, LocalEventStore, RemoteEventSource};
