//! OpenAI-compatible moderation and vision endpoints
use super::ModerationProvider;
use crate::config::ModerationConfig;
use crate::error::{ModerationError, Result};
use crate::models::TextClassification;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

pub struct OpenAiModerationClient {
    client: Client,
    api_key: String,
    base_url: String,
    text_model: String,
    vision_model: String,
}

// ============================================
// Request types
// ============================================

#[derive(Debug, Serialize)]
struct ModerationRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

// ============================================
// Response types
// ============================================

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

#[derive(Debug, Deserialize)]
struct ModerationResult {
    flagged: bool,
    #[serde(default)]
    categories: Map<String, Value>,
    #[serde(default)]
    category_scores: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

impl From<ModerationResult> for TextClassification {
    fn from(result: ModerationResult) -> Self {
        Self {
            flagged: result.flagged,
            categories: result
                .categories
                .into_iter()
                .filter_map(|(name, value)| value.as_bool().map(|flagged| (name, flagged)))
                .collect(),
            category_scores: result
                .category_scores
                .into_iter()
                .filter_map(|(name, value)| value.as_f64().map(|score| (name, score)))
                .collect(),
        }
    }
}

impl OpenAiModerationClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        text_model: impl Into<String>,
        vision_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            text_model: text_model.into(),
            vision_model: vision_model.into(),
        })
    }

    /// Build a client when the configuration carries an API key
    pub fn from_config(config: &ModerationConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key() else {
            return Ok(None);
        };

        Self::new(
            api_key,
            config.openai_api_base.clone(),
            config.moderation_text_model.clone(),
            config.moderation_vision_model.clone(),
            Duration::from_secs(config.moderation_request_timeout_secs),
        )
        .map(Some)
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<R> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ModerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ModerationError::Parse(format!("{}: {}", endpoint, e)))
    }
}

#[async_trait]
impl ModerationProvider for OpenAiModerationClient {
    async fn moderate_text(&self, text: &str) -> Result<TextClassification> {
        let request = ModerationRequest {
            model: &self.text_model,
            input: text,
        };

        let response: ModerationResponse = self.post("moderations", &request).await?;
        let result = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ModerationError::Parse("moderations: empty results".to_string()))?;

        debug!(flagged = result.flagged, "Text classified");
        Ok(result.into())
    }

    async fn describe_image(
        &self,
        image_url: &str,
        instruction: &str,
        max_tokens: u32,
    ) -> Result<String> {
        let request = ChatRequest {
            model: &self.vision_model,
            max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: instruction },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_url },
                    },
                ],
            }],
        };

        let response: ChatResponse = self.post("chat/completions", &request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ModerationError::Parse("chat/completions: no reply content".to_string()))
    }
}
