//! Schedule allocation
//!
//! Assigns start/end dates to an ordered task list inside a project window.
//! The pass is deterministic and single-shot: static priority weights, no
//! critical-path search, no resource leveling.

mod allocator;

pub use allocator::{OVERLAP_RATIO, WEIGHT_PER_TASK, allocate, nominal_duration_days, overruns};
