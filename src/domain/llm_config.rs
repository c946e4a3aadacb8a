use serde::{Deserialize, Serialize};

/// Settings for the chat-completions endpoint used for SQL synthesis.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LLMConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
            // One statement needs little headroom; low temperature keeps
            // generation deterministic-leaning.
            max_tokens: Some(500),
            temperature: Some(0.1),
        }
    }
}
