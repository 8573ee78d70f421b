//! SQLite-backed implementation of the CredentialStore port.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, instrument};

use schedlink_core::ports::CredentialStore;
use schedlink_domain::{
    IntegrationPatch, IntegrationRecord, Provider, Result, SchedlinkError,
};

use super::manager::SqlitePool;
use crate::errors::InfraError;

/// SQLite implementation of CredentialStore
pub struct SqliteCredentialStore {
    pool: Arc<SqlitePool>,
}

impl SqliteCredentialStore {
    /// Create a new credential store over a shared pool
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<IntegrationRecord> {
        let provider_text: String = row.get(1)?;
        let provider = Provider::from_str(&provider_text).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(IntegrationRecord {
            employee_id: row.get(0)?,
            provider,
            access_token: row.get(2)?,
            refresh_token: row.get(3)?,
            expires_at: row.get(4)?,
            provider_account_email: row.get(5)?,
            provider_account_id: row.get(6)?,
            scopes: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn select_record(
        conn: &rusqlite::Connection,
        employee_id: &str,
        provider: Provider,
    ) -> Result<Option<IntegrationRecord>> {
        conn.query_row(
            "SELECT employee_id, provider, access_token, refresh_token, expires_at,
                    provider_account_email, provider_account_id, scopes,
                    created_at, updated_at
             FROM employee_integrations
             WHERE employee_id = ?1 AND provider = ?2",
            params![employee_id, provider.as_str()],
            Self::row_to_record,
        )
        .optional()
        .map_err(|e| with_key(employee_id, provider, InfraError::from(e).into()))
    }
}

// Store failures carry the row key so a log line alone pins down which
// integration was being touched.
fn with_key(employee_id: &str, provider: Provider, err: SchedlinkError) -> SchedlinkError {
    match err {
        SchedlinkError::Database(msg) => {
            SchedlinkError::Database(format!("{msg} for {employee_id}/{provider}"))
        }
        other => other,
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    #[instrument(skip(self))]
    async fn get(
        &self,
        employee_id: &str,
        provider: Provider,
    ) -> Result<Option<IntegrationRecord>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| with_key(employee_id, provider, InfraError::from(e).into()))?;
        Self::select_record(&conn, employee_id, provider)
    }

    #[instrument(skip(self, patch))]
    async fn upsert(
        &self,
        employee_id: &str,
        provider: Provider,
        patch: &IntegrationPatch,
    ) -> Result<IntegrationRecord> {
        let conn = self
            .pool
            .get()
            .map_err(|e| with_key(employee_id, provider, InfraError::from(e).into()))?;
        let now = Utc::now().timestamp();

        // Single-statement upsert: COALESCE keeps stored values for absent
        // patch fields, so a patch without refresh_token never clears one.
        conn.execute(
            "INSERT INTO employee_integrations (
                employee_id, provider, access_token, refresh_token, expires_at,
                provider_account_email, provider_account_id, scopes,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            ON CONFLICT(employee_id, provider) DO UPDATE SET
                access_token = COALESCE(excluded.access_token, access_token),
                refresh_token = COALESCE(excluded.refresh_token, refresh_token),
                expires_at = COALESCE(excluded.expires_at, expires_at),
                provider_account_email =
                    COALESCE(excluded.provider_account_email, provider_account_email),
                provider_account_id =
                    COALESCE(excluded.provider_account_id, provider_account_id),
                scopes = COALESCE(excluded.scopes, scopes),
                updated_at = excluded.updated_at",
            params![
                employee_id,
                provider.as_str(),
                patch.access_token,
                patch.refresh_token,
                patch.expires_at,
                patch.provider_account_email,
                patch.provider_account_id,
                patch.scopes,
                now,
            ],
        )
        .map_err(|e| with_key(employee_id, provider, InfraError::from(e).into()))?;

        debug!(employee_id, provider = provider.as_str(), "upserted integration record");

        Self::select_record(&conn, employee_id, provider)?.ok_or_else(|| {
            SchedlinkError::Database(format!(
                "upserted row missing for {employee_id}/{provider}"
            ))
        })
    }
}
