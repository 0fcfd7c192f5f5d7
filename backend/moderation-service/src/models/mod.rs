pub mod classification;
pub mod verdict;

pub use classification::{ImageAssessment, TextClassification};
pub use verdict::{ContentKind, ModerationVerdict, Severity, FORBIDDEN_CONTENT_REASON};
