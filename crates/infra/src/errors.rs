//! Conversions from external infrastructure errors into domain errors.

use clubsync_domain::ClubSyncError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ClubSyncError);

impl From<InfraError> for ClubSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ClubSyncError> for InfraError {
    fn from(value: ClubSyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoClubSyncError {
    fn into_clubsync(self) -> ClubSyncError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → ClubSyncError */
/* -------------------------------------------------------------------------- */

impl IntoClubSyncError for SqlError {
    fn into_clubsync(self) -> ClubSyncError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        ClubSyncError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        ClubSyncError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        ClubSyncError::Database("unique constraint violation".into())
                    }
                    _ => ClubSyncError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => ClubSyncError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                ClubSyncError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                ClubSyncError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                ClubSyncError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidPath(path) => ClubSyncError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => ClubSyncError::Database("invalid SQL query".into()),
            other => ClubSyncError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_clubsync())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → ClubSyncError */
/* -------------------------------------------------------------------------- */

impl IntoClubSyncError for r2d2::Error {
    fn into_clubsync(self) -> ClubSyncError {
        ClubSyncError::Database(format!("connection pool error: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_clubsync())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ClubSyncError */
/* -------------------------------------------------------------------------- */

impl IntoClubSyncError for HttpError {
    fn into_clubsync(self) -> ClubSyncError {
        if self.is_timeout() {
            return ClubSyncError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ClubSyncError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                404 => ClubSyncError::NotFound(message),
                400..=499 => ClubSyncError::InvalidInput(message),
                _ => ClubSyncError::Network(message),
            };
        }

        ClubSyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_clubsync())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
