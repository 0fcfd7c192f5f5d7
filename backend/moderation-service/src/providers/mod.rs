//! Remote classifier providers

pub mod openai;

pub use openai::OpenAiModerationClient;

use crate::error::Result;
use crate::models::TextClassification;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModerationProvider: Send + Sync {
    /// Classify raw text
    async fn moderate_text(&self, text: &str) -> Result<TextClassification>;

    /// Ask a vision model about `image_url`; returns the model's raw reply
    async fn describe_image(
        &self,
        image_url: &str,
        instruction: &str,
        max_tokens: u32,
    ) -> Result<String>;
}
