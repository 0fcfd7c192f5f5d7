pub mod expiry_sweep;
pub mod scheduler;

pub use expiry_sweep::{
    ExpirySweep, PredicateFactory, SweepStats, DIRECT_SNAP_SWEEP, STORY_SWEEP,
};
pub use scheduler::SweepScheduler;
