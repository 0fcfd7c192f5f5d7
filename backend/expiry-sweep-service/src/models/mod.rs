pub mod predicate;
pub mod record;

pub use predicate::SweepPredicate;
pub use record::{ContentRecord, RecordKind};
