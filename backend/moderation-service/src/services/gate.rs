//! Moderation gate
//!
//! Text runs through the local [`PatternFilter`] first; a match short-circuits
//! the remote classifier. Images go straight to the vision model.
//!
//! Every path fails open: remote errors and malformed replies are logged and
//! the content is treated as not flagged. No method here returns an error.

use crate::config::ModerationConfig;
use crate::error::{ModerationError, Result};
use crate::models::{ContentKind, ImageAssessment, ModerationVerdict, Severity};
use crate::providers::{ModerationProvider, OpenAiModerationClient};
use crate::services::pattern_filter::PatternFilter;
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Instruction sent alongside every image
pub const IMAGE_MODERATION_INSTRUCTION: &str = "Analyze this image for inappropriate content \
(nudity, violence, hate symbols, self-harm, drugs). Respond with JSON only: \
{\"appropriate\": boolean, \"reason\": string}";

/// Key under which the verdict is attached to filtered items
pub const VERDICT_FIELD: &str = "moderation";

const DEFAULT_VISION_MAX_TOKENS: u32 = 300;

pub struct ModerationGate {
    filter: PatternFilter,
    provider: Option<Arc<dyn ModerationProvider>>,
    vision_max_tokens: u32,
}

impl ModerationGate {
    pub fn new(filter: PatternFilter, provider: Option<Arc<dyn ModerationProvider>>) -> Self {
        Self {
            filter,
            provider,
            vision_max_tokens: DEFAULT_VISION_MAX_TOKENS,
        }
    }

    pub fn with_vision_max_tokens(mut self, max_tokens: u32) -> Self {
        self.vision_max_tokens = max_tokens;
        self
    }

    /// Built-in patterns plus the optional words file, and the OpenAI
    /// classifier when an API key is configured.
    pub fn from_config(config: &ModerationConfig) -> Result<Self> {
        let mut filter = PatternFilter::default();
        if let Some(path) = &config.moderation_words_path {
            filter = filter.with_words_file(path)?;
        }

        let provider = OpenAiModerationClient::from_config(config)?
            .map(|client| Arc::new(client) as Arc<dyn ModerationProvider>);

        if provider.is_none() {
            warn!("No classifier API key configured, only local patterns will be checked");
        }

        info!(rules = filter.len(), remote = provider.is_some(), "Moderation gate initialized");

        Ok(Self::new(filter, provider).with_vision_max_tokens(config.moderation_vision_max_tokens))
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn moderate_text(&self, text: &str) -> ModerationVerdict {
        if let Some(rule) = self.filter.first_match(text) {
            debug!(rule = rule.name(), "Text matched local pattern");
            return ModerationVerdict::forbidden_content();
        }

        let Some(provider) = &self.provider else {
            return ModerationVerdict::safe();
        };

        match provider.moderate_text(text).await {
            Ok(classification) => {
                let categories = classification.flagged_categories();
                if categories.is_empty() {
                    return ModerationVerdict::safe();
                }

                let severity = Severity::from_score(classification.max_score());
                debug!(categories = ?categories, severity = severity.as_str(), "Text flagged by classifier");
                ModerationVerdict::flagged(categories, severity)
            }
            Err(e) => {
                warn!(error = %e, "Text classification failed, treating as not flagged");
                ModerationVerdict::safe()
            }
        }
    }

    pub async fn moderate_image(&self, image_url: &str) -> ModerationVerdict {
        let Some(provider) = &self.provider else {
            return ModerationVerdict::safe();
        };

        match self.assess_image(provider.as_ref(), image_url).await {
            Ok(assessment) => {
                if assessment.appropriate {
                    return ModerationVerdict::safe();
                }

                debug!(reason = %assessment.reason, "Image flagged by classifier");
                ModerationVerdict {
                    flagged: true,
                    reason: Some(assessment.reason).filter(|reason| !reason.is_empty()),
                    severity: None,
                    categories: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "Image moderation failed, treating as not flagged");
                ModerationVerdict::safe()
            }
        }
    }

    async fn assess_image(
        &self,
        provider: &dyn ModerationProvider,
        image_url: &str,
    ) -> Result<ImageAssessment> {
        let reply = provider
            .describe_image(image_url, IMAGE_MODERATION_INSTRUCTION, self.vision_max_tokens)
            .await?;

        serde_json::from_str(reply.trim())
            .map_err(|e| ModerationError::Parse(format!("image verdict: {}", e)))
    }

    pub async fn moderate(&self, kind: ContentKind, content: &str) -> ModerationVerdict {
        match kind {
            ContentKind::Text => self.moderate_text(content).await,
            ContentKind::Image => self.moderate_image(content).await,
        }
    }

    /// Moderate `field` of every item concurrently and keep the unflagged ones.
    ///
    /// Each item gets its verdict under [`VERDICT_FIELD`]. Output order
    /// follows input order. Items whose field is missing or not a string are
    /// kept as safe without being checked.
    pub async fn filter_items(&self, items: Vec<Value>, field: &str, kind: ContentKind) -> Vec<Value> {
        let verdicts = join_all(items.iter().map(|item| async move {
            match item.get(field).and_then(Value::as_str) {
                Some(content) => self.moderate(kind, content).await,
                None => ModerationVerdict::safe(),
            }
        }))
        .await;

        let total = items.len();
        let kept: Vec<Value> = items
            .into_iter()
            .zip(verdicts)
            .filter(|(_, verdict)| !verdict.flagged)
            .map(|(mut item, verdict)| {
                if let (Value::Object(map), Ok(verdict)) = (&mut item, serde_json::to_value(&verdict)) {
                    map.insert(VERDICT_FIELD.to_string(), verdict);
                }
                item
            })
            .collect();

        debug!(total, kept = kept.len(), "Filtered items");
        kept
    }
}
