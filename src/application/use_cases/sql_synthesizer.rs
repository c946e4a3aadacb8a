use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::response::clean_sql;
use std::sync::Arc;

/// Turns one natural-language question into one sanitized SQL statement
/// via the configured LLM. Holds the process-wide prompt context built at
/// startup.
pub struct SqlSynthesizer {
    client: Option<Arc<dyn LLMClient + Send + Sync>>,
    config: LLMConfig,
    prompt: Arc<String>,
}

impl SqlSynthesizer {
    pub fn new(
        client: Option<Arc<dyn LLMClient + Send + Sync>>,
        config: LLMConfig,
        prompt: String,
    ) -> Self {
        Self {
            client,
            config,
            prompt: Arc::new(prompt),
        }
    }

    /// May legitimately return an empty string; callers must treat that as
    /// "no SQL produced", never as an executable statement.
    pub async fn synthesize(&self, question: &str) -> Result<String> {
        let client = self.client.as_ref().ok_or_else(|| {
            AppError::ModelUnavailable("LLM client not initialized".to_string())
        })?;

        let raw = client
            .generate(&self.config, &self.prompt, question)
            .await
            .map_err(|e| match e {
                e @ (AppError::GenerationFailed(_) | AppError::ModelUnavailable(_)) => e,
                other => AppError::GenerationFailed(other.to_string()),
            })?;

        Ok(clean_sql(&raw))
    }
}
