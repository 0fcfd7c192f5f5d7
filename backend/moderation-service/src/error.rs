use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Classifier API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed classifier response: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<envy::Error> for ModerationError {
    fn from(err: envy::Error) -> Self {
        ModerationError::Config(err.to_string())
    }
}

impl From<regex::Error> for ModerationError {
    fn from(err: regex::Error) -> Self {
        ModerationError::Config(format!("invalid pattern: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, ModerationError>;
