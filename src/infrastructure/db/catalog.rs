use crate::domain::error::{AppError, Result};
use crate::domain::schema::{ColumnDescription, SchemaDescription, TableDescription};
use crate::infrastructure::config::DatabaseConfig;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, Row};
use std::time::Duration;
use tracing::{info, warn};

const TABLES_QUERY: &str = r#"
    SELECT table_name
    FROM information_schema.tables
    WHERE table_schema = 'public'
    ORDER BY table_name
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT column_name, data_type
    FROM information_schema.columns
    WHERE table_name = $1
    ORDER BY ordinal_position
"#;

/// Introspects the public schema into a [`SchemaDescription`]. Built for
/// one-shot use at startup; opens a fresh connection per call.
pub struct SchemaCatalog {
    options: PgConnectOptions,
    connect_timeout: Duration,
    query_timeout: Duration,
}

impl SchemaCatalog {
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        Ok(Self {
            options: super::connect_options(config)?,
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            query_timeout: Duration::from_secs(config.query_timeout_secs),
        })
    }

    /// Introspect the schema, degrading to an empty description if the
    /// database cannot be reached or the catalog queries fail. SQL
    /// synthesis then proceeds without schema context instead of the
    /// service refusing to start.
    pub async fn introspect(&self) -> SchemaDescription {
        match self.try_introspect().await {
            Ok(schema) => schema,
            Err(e) => {
                warn!("Schema introspection failed, continuing with empty schema: {}", e);
                SchemaDescription::default()
            }
        }
    }

    async fn try_introspect(&self) -> Result<SchemaDescription> {
        let mut conn = super::open_connection(&self.options, self.connect_timeout).await?;

        let table_rows = tokio::time::timeout(
            self.query_timeout,
            sqlx::query(TABLES_QUERY).fetch_all(&mut conn),
        )
        .await
        .map_err(|_| {
            AppError::CatalogUnavailable(format!(
                "Table listing timed out after {} seconds",
                self.query_timeout.as_secs()
            ))
        })?
        .map_err(|e| AppError::CatalogUnavailable(format!("Failed to list tables: {}", e)))?;

        let mut tables = Vec::with_capacity(table_rows.len());
        for table_row in table_rows {
            let table_name: String = table_row.try_get("table_name").map_err(|e| {
                AppError::CatalogUnavailable(format!("Failed to parse table_name: {}", e))
            })?;

            let column_rows = tokio::time::timeout(
                self.query_timeout,
                sqlx::query(COLUMNS_QUERY)
                    .bind(&table_name)
                    .fetch_all(&mut conn),
            )
            .await
            .map_err(|_| {
                AppError::CatalogUnavailable(format!(
                    "Column listing timed out after {} seconds",
                    self.query_timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                AppError::CatalogUnavailable(format!(
                    "Failed to list columns for '{}': {}",
                    table_name, e
                ))
            })?;

            let mut columns = Vec::with_capacity(column_rows.len());
            for column_row in column_rows {
                let name: String = column_row.try_get("column_name").map_err(|e| {
                    AppError::CatalogUnavailable(format!("Failed to parse column_name: {}", e))
                })?;
                let data_type: String = column_row.try_get("data_type").map_err(|e| {
                    AppError::CatalogUnavailable(format!("Failed to parse data_type: {}", e))
                })?;
                columns.push(ColumnDescription { name, data_type });
            }

            tables.push(TableDescription {
                name: table_name,
                columns,
            });
        }

        let _ = conn.close().await;

        info!("Introspected {} tables from public schema", tables.len());

        Ok(SchemaDescription { tables })
    }

    /// Lightweight connectivity probe for the health boundary: connect,
    /// run a trivial query, close. Never touches the pipeline.
    pub async fn check_connectivity(&self) -> bool {
        let Ok(mut conn) = super::open_connection(&self.options, self.connect_timeout).await else {
            return false;
        };

        let healthy = sqlx::query("SELECT 1 as health_check")
            .fetch_one(&mut conn)
            .await
            .is_ok();

        let _ = conn.close().await;
        healthy
    }
}
