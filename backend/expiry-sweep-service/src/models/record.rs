use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Kind of ephemeral content a record represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Story,
    Direct,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Story => "story",
            RecordKind::Direct => "direct",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "story" => Ok(RecordKind::Story),
            "direct" => Ok(RecordKind::Direct),
            other => Err(format!("unknown record type: {}", other)),
        }
    }
}

/// Shared content whose lifetime ends at `expires_at`.
///
/// Records are written by other services; this service only reads and
/// deletes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub expires_at: DateTime<Utc>,
    /// Only meaningful for direct snaps
    #[serde(default)]
    pub viewed: bool,
    /// Download URL of the attached image, if any
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ContentRecord {
    pub fn story(id: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            kind: RecordKind::Story,
            expires_at,
            viewed: false,
            image_url: None,
        }
    }

    pub fn direct(id: impl Into<String>, expires_at: DateTime<Utc>, viewed: bool) -> Self {
        Self {
            id: id.into(),
            kind: RecordKind::Direct,
            expires_at,
            viewed,
            image_url: None,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Image URL, ignoring empty strings
    pub fn blob_reference(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Raw row as stored in `content_records`
#[derive(Debug, FromRow)]
pub(crate) struct ContentRecordRow {
    pub id: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub expires_at: DateTime<Utc>,
    pub viewed: bool,
    pub image_url: Option<String>,
}

impl TryFrom<ContentRecordRow> for ContentRecord {
    type Error = String;

    fn try_from(row: ContentRecordRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            kind: row.kind.parse()?,
            expires_at: row.expires_at,
            viewed: row.viewed,
            image_url: row.image_url,
        })
    }
}
