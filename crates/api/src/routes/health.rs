use std::sync::Arc;

use axum::extract::State;

use super::ApiError;
use crate::AppContext;

/// Liveness probe that also verifies a pooled database connection.
pub async fn health(State(ctx): State<Arc<AppContext>>) -> Result<&'static str, ApiError> {
    ctx.db.health_check()?;
    Ok("ok")
}
