mod models;

pub use models::*;

use async_trait::async_trait;
use sqlx::{Connection, PgConnection};
use thiserror::Error;

/// Connection and query failures are kept apart so handlers can report which
/// stage of a request failed.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database connection failed: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("database query failed: {0}")]
    Query(#[source] sqlx::Error),
}

/// Seam for the document store. Handlers depend on this rather than a live
/// Postgres connection.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert_submission(&self, submission: &NewSubmission) -> Result<(), DbError>;

    async fn aggregate_addresses(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<AddressAggregate>, DbError>;
}

/// Postgres-backed store. Each operation opens one dedicated single-use
/// connection and releases it only after its query future has resolved.
pub struct PgStore {
    database_url: String,
}

impl PgStore {
    pub fn new(database_url: &str) -> Self {
        Self {
            database_url: database_url.to_string(),
        }
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn insert_submission(&self, submission: &NewSubmission) -> Result<(), DbError> {
        let mut conn = connect(&self.database_url).await?;
        let result = run_insert(&mut conn, submission).await;
        close(conn).await;
        result
    }

    async fn aggregate_addresses(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<AddressAggregate>, DbError> {
        let mut conn = connect(&self.database_url).await?;
        let result = run_aggregation(&mut conn, skip, limit).await;
        close(conn).await;
        result
    }
}

/// Opens a dedicated connection for one operation. No reconnection.
async fn connect(database_url: &str) -> Result<PgConnection, DbError> {
    PgConnection::connect(database_url)
        .await
        .map_err(DbError::Connect)
}

/// Gracefully releases a single-use connection. Close failures are logged
/// rather than surfaced; the operation's outcome is already decided by then.
async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!("Failed to close database connection: {}", e);
    }
}

pub async fn run_migrations(database_url: &str) -> Result<(), DbError> {
    let mut conn = connect(database_url).await?;
    let result = sqlx::migrate!("./migrations").run(&mut conn).await;
    close(conn).await;
    result.map_err(|e| DbError::Query(e.into()))
}

async fn run_insert(conn: &mut PgConnection, submission: &NewSubmission) -> Result<(), DbError> {
    sqlx::query(
        r#"
        INSERT INTO addresses (address, timestamp, score, result)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(&submission.address)
    .bind(submission.timestamp)
    .bind(submission.score)
    .bind(&submission.result)
    .execute(&mut *conn)
    .await
    .map_err(DbError::Query)?;
    Ok(())
}

/// Per-address rollup: sum of scores and submission count, grouped by exact
/// address equality. No ordering is imposed; `skip`/`limit` are passed to the
/// store as given.
async fn run_aggregation(
    conn: &mut PgConnection,
    skip: i64,
    limit: i64,
) -> Result<Vec<AddressAggregate>, DbError> {
    sqlx::query_as::<_, AddressAggregate>(
        r#"
        SELECT address, SUM(score)::BIGINT AS total_score, COUNT(*) AS count
        FROM addresses
        GROUP BY address
        OFFSET $1 LIMIT $2
        "#,
    )
    .bind(skip)
    .bind(limit)
    .fetch_all(&mut *conn)
    .await
    .map_err(DbError::Query)
}
