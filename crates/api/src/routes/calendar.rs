//! Google Calendar authorization and push-notification handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use calsync_domain::CalSyncError;
use serde::Deserialize;
use tracing::{info, warn};

use super::error::timeout_response;
use super::ApiError;
use crate::utils::logging::log_request_outcome;
use crate::AppContext;

pub const AUTHORIZED_MESSAGE: &str = "Successfully authorized.";

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    /// Set by the provider when the user declines consent
    pub error: Option<String>,
}

/// `GET /google-calendar/authorization/request`
pub async fn authorization_request(
    State(ctx): State<Arc<AppContext>>,
) -> Result<String, ApiError> {
    Ok(ctx.calendar.authorization_url()?)
}

/// `GET /google-calendar/authorization/callback?code=...`
pub async fn authorization_callback(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<CallbackParams>,
) -> Result<&'static str, ApiError> {
    let started = Instant::now();

    if let Some(reason) = params.error {
        warn!(reason = %reason, "authorization declined by provider");
        return Err(CalSyncError::Auth(format!("authorization declined: {reason}")).into());
    }
    let code = params
        .code
        .ok_or_else(|| CalSyncError::InvalidInput("missing authorization code".to_string()))?;

    let result = ctx.calendar.authorize_account(&code).await;
    log_request_outcome("authorization_callback", started.elapsed(), result.as_ref().err());

    let account = result?;
    info!(account_id = %account.account_id, email = %account.primary_email, "account authorized");
    Ok(AUTHORIZED_MESSAGE)
}

/// `POST /google-calendar/{account_id}/events/update`
///
/// Push-notification target: runs one synchronization pass for the account
/// and answers with its summary.
pub async fn events_update(
    State(ctx): State<Arc<AppContext>>,
    Path(account_id): Path<String>,
) -> Response {
    let started = Instant::now();
    let timeout = ctx.sync_timeout();

    match tokio::time::timeout(timeout, ctx.calendar.synchronize(&account_id)).await {
        Ok(Ok(summary)) => {
            log_request_outcome("events_update", started.elapsed(), None);
            Json(summary).into_response()
        }
        Ok(Err(err)) => {
            log_request_outcome("events_update", started.elapsed(), Some(&err));
            ApiError(err).into_response()
        }
        Err(_) => {
            warn!(account_id = %account_id, timeout_secs = timeout.as_secs(), "sync pass timed out");
            timeout_response(timeout.as_secs())
        }
    }
}
