use crate::domain::error::{AppError, Result};
use crate::domain::query::{CellValue, ExecutionResult, Row};
use crate::infrastructure::config::DatabaseConfig;
use async_trait::async_trait;
use bigdecimal::ToPrimitive;
use sqlx::postgres::{PgConnectOptions, PgRow};
use sqlx::types::BigDecimal;
use sqlx::{Column, Connection, Row as SqlxRow};
use std::time::Duration;

/// Seam between the orchestrator and the database, so the pipeline can be
/// exercised with in-memory executors in tests.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute exactly the given statement text and materialize all rows.
    async fn execute(&self, sql: &str) -> Result<ExecutionResult>;
}

/// Executes statements against PostgreSQL on a fresh connection per call.
/// No pooling: for this low-concurrency analytics workload the engine's
/// own connection limit is the backpressure mechanism.
pub struct PgQueryExecutor {
    options: PgConnectOptions,
    connect_timeout: Duration,
    query_timeout: Duration,
}

impl PgQueryExecutor {
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        Ok(Self {
            options: super::connect_options(config)?,
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            query_timeout: Duration::from_secs(config.query_timeout_secs),
        })
    }
}

#[async_trait]
impl QueryExecutor for PgQueryExecutor {
    async fn execute(&self, sql: &str) -> Result<ExecutionResult> {
        let mut conn = super::open_connection(&self.options, self.connect_timeout).await?;

        let result = tokio::time::timeout(
            self.query_timeout,
            sqlx::query(sql).fetch_all(&mut conn),
        )
        .await
        .map_err(|_| {
            AppError::ExecutionFailed(format!(
                "Query timed out after {} seconds",
                self.query_timeout.as_secs()
            ))
        })?
        .map_err(classify_sqlx_error);

        let _ = conn.close().await;
        let rows = result?;

        let mut columns: Vec<String> = Vec::new();
        let mut materialized: Vec<Row> = Vec::with_capacity(rows.len());

        for row in &rows {
            if columns.is_empty() {
                columns = row.columns().iter().map(|c| c.name().to_string()).collect();
            }

            let mut cells = Vec::with_capacity(row.columns().len());
            for (i, column) in row.columns().iter().enumerate() {
                cells.push((column.name().to_string(), extract_cell_value(row, i)));
            }
            materialized.push(Row { cells });
        }

        Ok(ExecutionResult {
            columns,
            row_count: materialized.len(),
            rows: materialized,
        })
    }
}

/// Statement-level rejections carry the engine's own message; everything
/// else (I/O errors, protocol failures, drops mid-transfer) is a
/// connectivity fault. No retry in either case.
fn classify_sqlx_error(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(db) => AppError::ExecutionFailed(db.message().to_string()),
        other => AppError::ConnectionFailed(other.to_string()),
    }
}

/// Decode one cell into a tagged scalar, trying types in order of
/// likelihood for analytics queries.
fn extract_cell_value(row: &PgRow, index: usize) -> CellValue {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map(CellValue::Int).unwrap_or(CellValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(index) {
        return v.map(|n| CellValue::Int(n.into())).unwrap_or(CellValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map(CellValue::Float).unwrap_or(CellValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<BigDecimal>, _>(index) {
        return v
            .map(|d| match d.to_f64() {
                Some(f) => CellValue::Float(f),
                None => CellValue::Text(d.to_string()),
            })
            .unwrap_or(CellValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v.map(CellValue::Bool).unwrap_or(CellValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map(CellValue::Text).unwrap_or(CellValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index) {
        return v.map(CellValue::Timestamp).unwrap_or(CellValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(index) {
        return v
            .map(|dt| CellValue::Timestamp(dt.and_utc()))
            .unwrap_or(CellValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(index) {
        return v.map(CellValue::Date).unwrap_or(CellValue::Null);
    }

    // Unsupported types render as null rather than failing the row
    CellValue::Null
}
