//! # calsync API
//!
//! HTTP surface of the calendar sync service: the OAuth authorization flow,
//! the push-notification target that triggers a sync pass, and a health
//! check. [`AppContext`] wires the infrastructure adapters into the core
//! calendar service.

pub mod context;
pub mod routes;
pub mod utils;

pub use context::AppContext;
pub use routes::build_router;
