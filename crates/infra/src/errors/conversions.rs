//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use schedlink_domain::SchedlinkError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SchedlinkError);

impl From<InfraError> for SchedlinkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SchedlinkError> for InfraError {
    fn from(value: SchedlinkError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSchedlinkError {
    fn into_schedlink(self) -> SchedlinkError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → SchedlinkError */
/* -------------------------------------------------------------------------- */

impl IntoSchedlinkError for SqlError {
    fn into_schedlink(self) -> SchedlinkError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        SchedlinkError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        SchedlinkError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 1555) | (ErrorCode::ConstraintViolation, 2067) => {
                        SchedlinkError::Database("unique constraint violation".into())
                    }
                    _ => SchedlinkError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                SchedlinkError::Database("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                SchedlinkError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                SchedlinkError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                SchedlinkError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidQuery => SchedlinkError::Database("invalid SQL query".into()),
            other => SchedlinkError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_schedlink())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → SchedlinkError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(SchedlinkError::Database(format!("pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SchedlinkError */
/* -------------------------------------------------------------------------- */

impl IntoSchedlinkError for HttpError {
    fn into_schedlink(self) -> SchedlinkError {
        if self.is_timeout() {
            return SchedlinkError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return SchedlinkError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message = format!(
                "HTTP {} {}",
                code,
                status.canonical_reason().unwrap_or("unknown status")
            );
            return SchedlinkError::Provider(message);
        }

        SchedlinkError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_schedlink())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
