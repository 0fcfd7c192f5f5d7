pub mod gate;
pub mod pattern_filter;

pub use gate::{ModerationGate, IMAGE_MODERATION_INSTRUCTION, VERDICT_FIELD};
pub use pattern_filter::{ContentRule, PatternFilter, RegexRule};
