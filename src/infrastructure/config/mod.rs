use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the discrete fields.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub connect_timeout_secs: u64,
    pub query_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "analytics_user".to_string(),
            password: "analytics_pass".to_string(),
            dbname: "analytics_db".to_string(),
            connect_timeout_secs: 10,
            query_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Full service configuration: `askdb.toml` overridden by `ASKDB_*`
/// environment variables (`__` separates nesting, e.g.
/// `ASKDB_DATABASE__HOST`). `DATABASE_URL`, `GROQ_API_KEY` and `PORT` are
/// honored as bare fallbacks for compatibility with plain deployments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub llm: LLMConfig,
}

impl ServiceConfig {
    pub fn load() -> Result<Self> {
        let mut config: ServiceConfig =
            Figment::from(Serialized::defaults(ServiceConfig::default()))
                .merge(Toml::file("askdb.toml"))
                .merge(Env::prefixed("ASKDB_").split("__"))
                .extract()
                .map_err(|e| AppError::ConfigError(e.to_string()))?;

        if config.database.url.is_none() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                config.database.url = Some(url);
            }
        }
        if config.llm.api_key.is_none() {
            if let Ok(key) = std::env::var("GROQ_API_KEY") {
                config.llm.api_key = Some(key);
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                config.server.port = port;
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_analytics_database() {
        let config = ServiceConfig::default();
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.dbname, "analytics_db");
        assert_eq!(config.database.connect_timeout_secs, 10);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn defaults_use_groq_endpoint_with_low_temperature() {
        let config = ServiceConfig::default();
        assert_eq!(config.llm.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.temperature, Some(0.1));
        assert_eq!(config.llm.max_tokens, Some(500));
        assert!(config.llm.api_key.is_none());
    }
}
