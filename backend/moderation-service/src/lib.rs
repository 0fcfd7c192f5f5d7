//! Moderation Service Library
//!
//! In-process content gate for user text and images.
//!
//! - [`PatternFilter`]: ordered local rules checked before anything else
//! - [`ModerationProvider`]: remote classifier port, with an OpenAI-compatible adapter
//! - [`ModerationGate`]: combines both and always answers with a
//!   [`ModerationVerdict`], treating classifier failures as not flagged

pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod services;

pub use config::ModerationConfig;
pub use error::{ModerationError, Result};
pub use models::{
    ContentKind, ImageAssessment, ModerationVerdict, Severity, TextClassification,
};
pub use providers::{ModerationProvider, OpenAiModerationClient};
pub use services::{ContentRule, ModerationGate, PatternFilter, RegexRule};
