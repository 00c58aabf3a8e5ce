//! SQLite persistence adapters

pub mod account_repository;
pub mod event_repository;
pub mod manager;
pub mod pool;

pub use account_repository::SqliteAccountStore;
pub use event_repository::SqliteEventStore;
pub use manager::DbManager;
pub use pool::{create_sqlite_pool, SqliteConnection, SqlitePool};
