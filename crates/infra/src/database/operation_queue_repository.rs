//! SQLite-backed implementation of the operation queue port.
//!
//! Persists one row per queued mutation and serves the sync coordinator's
//! ordered reads. All rusqlite work runs on the blocking thread pool; the
//! async port surface is a thin wrapper around it.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use clubsync_core::OperationQueue;
use clubsync_domain::{
    ClubSyncError, NewOperation, OperationKind, OperationRecord, ResourceKind,
    Result as DomainResult,
};
use rusqlite::{params, Row};
use tokio::task;
use uuid::Uuid;

use super::manager::{DbConnection, DbManager};
use crate::errors::InfraError;

/// SQLite-backed durable operation queue.
pub struct SqliteOperationQueue {
    db: Arc<DbManager>,
}

impl SqliteOperationQueue {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn insert_record(conn: &DbConnection, record: &OperationRecord) -> DomainResult<()> {
        conn.execute(
            QUEUE_INSERT_SQL,
            params![
                record.id,
                record.kind.to_string(),
                record.resource.to_string(),
                record.payload_json,
                record.created_at,
                record.retry_count,
            ],
        )
        .map(|_| ())
        .map_err(map_sql_error)
    }

    fn fetch_pending(conn: &DbConnection) -> DomainResult<Vec<OperationRecord>> {
        let mut stmt = conn.prepare(QUEUE_LIST_SQL).map_err(map_sql_error)?;
        let rows = stmt
            .query_map(params![], map_operation_row)
            .map_err(map_sql_error)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(map_sql_error)?;
        Ok(rows)
    }
}

#[async_trait]
impl OperationQueue for SqliteOperationQueue {
    async fn enqueue(&self, operation: &NewOperation) -> DomainResult<String> {
        let db = Arc::clone(&self.db);
        let record = OperationRecord {
            id: Uuid::now_v7().to_string(),
            kind: operation.kind,
            resource: operation.resource,
            payload_json: operation.payload_json.clone(),
            created_at: Utc::now().timestamp_millis(),
            retry_count: 0,
        };
        let id = record.id.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            Self::insert_record(&conn, &record)
        })
        .await
        .map_err(map_join_error)??;

        Ok(id)
    }

    async fn list_pending(&self) -> DomainResult<Vec<OperationRecord>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<OperationRecord>> {
            let conn = db.get_connection()?;
            Self::fetch_pending(&conn)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn increment_retry(&self, id: &str) -> DomainResult<i32> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || -> DomainResult<i32> {
            let conn = db.get_connection()?;
            conn.query_row(QUEUE_INCREMENT_RETRY_SQL, params![id], |row| row.get(0))
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn remove(&self, id: &str) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            // Zero affected rows is fine: removal is idempotent.
            conn.execute(QUEUE_DELETE_SQL, params![id]).map(|_| ()).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn clear(&self) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(QUEUE_CLEAR_SQL, params![]).map(|_| ()).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

const QUEUE_INSERT_SQL: &str = "INSERT INTO operation_queue (
        id, kind, resource, payload_json, created_at, retry_count
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const QUEUE_LIST_SQL: &str = "SELECT
        id, kind, resource, payload_json, created_at, retry_count
    FROM operation_queue
    ORDER BY created_at ASC, seq ASC";

const QUEUE_INCREMENT_RETRY_SQL: &str = "UPDATE operation_queue
    SET retry_count = retry_count + 1
    WHERE id = ?1
    RETURNING retry_count";

const QUEUE_DELETE_SQL: &str = "DELETE FROM operation_queue WHERE id = ?1";

const QUEUE_CLEAR_SQL: &str = "DELETE FROM operation_queue";

fn map_operation_row(row: &Row<'_>) -> rusqlite::Result<OperationRecord> {
    let kind_raw: String = row.get(1)?;
    let resource_raw: String = row.get(2)?;

    let kind = OperationKind::from_str(&kind_raw).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, err)),
        )
    })?;
    let resource = ResourceKind::from_str(&resource_raw).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, err)),
        )
    })?;

    Ok(OperationRecord {
        id: row.get(0)?,
        kind,
        resource,
        payload_json: row.get(3)?,
        created_at: row.get(4)?,
        retry_count: row.get(5)?,
    })
}

fn map_sql_error(err: rusqlite::Error) -> ClubSyncError {
    InfraError::from(err).into()
}

fn map_join_error(err: task::JoinError) -> ClubSyncError {
    if err.is_cancelled() {
        ClubSyncError::Internal("queue task cancelled".into())
    } else {
        ClubSyncError::Internal(format!("queue task panic: {err}"))
    }
}
