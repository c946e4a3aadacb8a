pub mod groq;

use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;

pub use groq::GroqClient;

#[async_trait]
pub trait LLMClient {
    /// Issues one completion request: `system` as the fixed instruction,
    /// `user` as the sole user turn. Returns the raw completion text.
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String>;
}
