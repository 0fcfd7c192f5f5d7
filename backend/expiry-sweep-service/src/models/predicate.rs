use super::record::{ContentRecord, RecordKind};
use chrono::{DateTime, Utc};

/// Eligibility filter for one sweep run, evaluated against a fixed `now`
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPredicate {
    pub kind: RecordKind,
    /// When set, the record's `viewed` flag must equal this value
    pub viewed: Option<bool>,
    pub expires_at_or_before: DateTime<Utc>,
}

impl SweepPredicate {
    /// Stories whose expiry has passed
    pub fn stories(now: DateTime<Utc>) -> Self {
        Self {
            kind: RecordKind::Story,
            viewed: None,
            expires_at_or_before: now,
        }
    }

    /// Direct snaps that were viewed and have expired
    pub fn viewed_direct(now: DateTime<Utc>) -> Self {
        Self {
            kind: RecordKind::Direct,
            viewed: Some(true),
            expires_at_or_before: now,
        }
    }

    pub fn matches(&self, record: &ContentRecord) -> bool {
        record.kind == self.kind
            && self.viewed.map_or(true, |viewed| record.viewed == viewed)
            && record.expires_at <= self.expires_at_or_before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_story_predicate() {
        let now = Utc::now();
        let predicate = SweepPredicate::stories(now);

        assert!(predicate.matches(&ContentRecord::story("expired", now - Duration::hours(1))));
        assert!(predicate.matches(&ContentRecord::story("boundary", now)));
        assert!(!predicate.matches(&ContentRecord::story("live", now + Duration::seconds(1))));
        assert!(!predicate.matches(&ContentRecord::direct("snap", now - Duration::hours(1), true)));
    }

    #[test]
    fn test_direct_predicate_requires_viewed() {
        let now = Utc::now();
        let predicate = SweepPredicate::viewed_direct(now);
        let expired = now - Duration::days(2);

        assert!(predicate.matches(&ContentRecord::direct("seen", expired, true)));
        assert!(!predicate.matches(&ContentRecord::direct("unseen", expired, false)));
        assert!(!predicate.matches(&ContentRecord::direct("fresh", now + Duration::hours(1), true)));
        assert!(!predicate.matches(&ContentRecord::story("story", expired)));
    }
}
