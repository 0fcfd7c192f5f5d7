//! Configuration for the moderation gate
use crate::error::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ModerationConfig {
    /// API key for the classifier; without it only the local filter runs
    #[serde(default)]
    pub openai_api_key: Option<String>,

    #[serde(default = "default_api_base")]
    pub openai_api_base: String,

    #[serde(default = "default_text_model")]
    pub moderation_text_model: String,

    #[serde(default = "default_vision_model")]
    pub moderation_vision_model: String,

    /// Token budget for the image verdict reply
    #[serde(default = "default_vision_max_tokens")]
    pub moderation_vision_max_tokens: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub moderation_request_timeout_secs: u64,

    /// Optional word list, one entry per line, appended to the built-in patterns
    #[serde(default)]
    pub moderation_words_path: Option<String>,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_text_model() -> String {
    "omni-moderation-latest".to_string()
}

fn default_vision_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_vision_max_tokens() -> u32 {
    300
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ModerationConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// API key, treating a blank value as unset
    pub fn api_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_api_base: default_api_base(),
            moderation_text_model: default_text_model(),
            moderation_vision_model: default_vision_model(),
            moderation_vision_max_tokens: default_vision_max_tokens(),
            moderation_request_timeout_secs: default_request_timeout_secs(),
            moderation_words_path: None,
        }
    }
}
