//! Conversions from external infrastructure errors into domain errors.

use calsync_domain::CalSyncError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CalSyncError);

impl From<InfraError> for CalSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CalSyncError> for InfraError {
    fn from(value: CalSyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoCalSyncError {
    fn into_calsync(self) -> CalSyncError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → CalSyncError */
/* -------------------------------------------------------------------------- */

impl IntoCalSyncError for SqlError {
    fn into_calsync(self) -> CalSyncError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => CalSyncError::Store("database is busy".into()),
                    (ErrorCode::DatabaseLocked, _) => {
                        CalSyncError::Store("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067 | 1555) => {
                        CalSyncError::Store("unique constraint violation".into())
                    }
                    (ErrorCode::DiskFull, _) => CalSyncError::Store("disk is full".into()),
                    _ => CalSyncError::Store(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => CalSyncError::Store("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                CalSyncError::Store(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                CalSyncError::Store(format!("invalid column type for {name}: {ty}"))
            }
            RE::InvalidPath(path) => {
                CalSyncError::Config(format!("invalid database path: {}", path.to_string_lossy()))
            }
            other => CalSyncError::Store(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_calsync())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → CalSyncError */
/* -------------------------------------------------------------------------- */

impl IntoCalSyncError for r2d2::Error {
    fn into_calsync(self) -> CalSyncError {
        CalSyncError::Store(format!("connection pool error: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_calsync())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → CalSyncError */
/* -------------------------------------------------------------------------- */

impl IntoCalSyncError for serde_json::Error {
    fn into_calsync(self) -> CalSyncError {
        CalSyncError::Store(format!("invalid stored JSON: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_calsync())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CalSyncError */
/* -------------------------------------------------------------------------- */

impl IntoCalSyncError for HttpError {
    fn into_calsync(self) -> CalSyncError {
        if self.is_timeout() {
            return CalSyncError::RemoteFetch("HTTP request timed out".into());
        }

        if self.is_connect() {
            return CalSyncError::RemoteFetch("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                410 => CalSyncError::SyncCursorInvalidated(message),
                _ => CalSyncError::RemoteFetch(message),
            };
        }

        if self.is_decode() {
            return CalSyncError::RemoteFetch(format!("malformed provider response: {self}"));
        }

        CalSyncError::RemoteFetch(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_calsync())
    }
}

/// Shorthand used by adapters: `.map_err(map_sql_error)`.
pub(crate) fn map_sql_error(err: SqlError) -> CalSyncError {
    CalSyncError::from(InfraError::from(err))
}

pub(crate) fn map_pool_error(err: r2d2::Error) -> CalSyncError {
    CalSyncError::from(InfraError::from(err))
}

pub(crate) fn map_http_error(err: HttpError) -> CalSyncError {
    CalSyncError::from(InfraError::from(err))
}

/// Failure of a `spawn_blocking` task running store work.
pub(crate) fn map_join_error(err: tokio::task::JoinError) -> CalSyncError {
    if err.is_cancelled() {
        CalSyncError::Internal("blocking task cancelled".into())
    } else {
        CalSyncError::Internal(format!("blocking task failed: {err}"))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use rusqlite::ffi::{Error as FfiError, ErrorCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn status_error(status: StatusCode) -> HttpError {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err()
    }

    #[test]
    fn sqlite_busy_maps_to_store_error() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::DatabaseBusy, extended_code: 5 },
            Some("database is locked".into()),
        );

        let mapped: CalSyncError = InfraError::from(err).into();
        match mapped {
            CalSyncError::Store(msg) => assert!(msg.contains("busy")),
            other => panic!("expected store error, got {other:?}"),
        }
    }

    #[test]
    fn no_rows_maps_to_store_error() {
        let mapped = map_sql_error(SqlError::QueryReturnedNoRows);
        assert!(matches!(mapped, CalSyncError::Store(_)));
    }

    #[tokio::test]
    async fn http_status_410_maps_to_cursor_invalidated() {
        let mapped = map_http_error(status_error(StatusCode::GONE).await);
        match mapped {
            CalSyncError::SyncCursorInvalidated(msg) => assert!(msg.contains("410")),
            other => panic!("expected cursor invalidation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_status_401_maps_to_remote_fetch() {
        let mapped = map_http_error(status_error(StatusCode::UNAUTHORIZED).await);
        match mapped {
            CalSyncError::RemoteFetch(msg) => assert!(msg.contains("401")),
            other => panic!("expected remote fetch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn panicked_blocking_task_maps_to_internal() {
        let join_err = tokio::task::spawn_blocking(|| -> u8 { panic!("boom") }).await.unwrap_err();

        match map_join_error(join_err) {
            CalSyncError::Internal(msg) => assert!(msg.contains("blocking task failed")),
            other => panic!("expected internal error, got {other:?}"),
        }
    }
}
