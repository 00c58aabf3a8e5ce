//! HTTP routes

pub mod calendar;
pub mod error;
pub mod health;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

pub use error::ApiError;

use crate::AppContext;

/// Build the service router over a shared [`AppContext`].
pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/google-calendar/authorization/request", get(calendar::authorization_request))
        .route("/google-calendar/authorization/callback", get(calendar::authorization_callback))
        .route("/google-calendar/{account_id}/events/update", post(calendar::events_update))
        .with_state(ctx)
}
