pub mod catalog;
pub mod executor;

use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use std::time::Duration;

/// Build connection options from configuration. A full URL wins over the
/// discrete host/port/user fields.
pub fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions> {
    if let Some(url) = &config.url {
        url.parse::<PgConnectOptions>()
            .map_err(|e| AppError::ConfigError(format!("Invalid database URL: {}", e)))
    } else {
        Ok(PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.dbname))
    }
}

/// Open a fresh connection bounded by the connect timeout. Timeouts and
/// refusals both surface as `ConnectionFailed`.
pub(crate) async fn open_connection(
    options: &PgConnectOptions,
    timeout: Duration,
) -> Result<PgConnection> {
    match tokio::time::timeout(timeout, PgConnection::connect_with(options)).await {
        Ok(Ok(conn)) => Ok(conn),
        Ok(Err(e)) => Err(AppError::ConnectionFailed(e.to_string())),
        Err(_) => Err(AppError::ConnectionFailed(format!(
            "Connection timed out after {} seconds",
            timeout.as_secs()
        ))),
    }
}
