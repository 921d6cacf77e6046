//! Planning pipeline - conversation in, dated tasks out
//!
//! ```text
//! conversation → ConversationExtractor → Extraction → allocate → PlanOutcome
//!                        ↑                                ↑
//!                 LlmClient / templates            DateWindow (+ hints)
//! ```

mod planner;

pub use planner::{PlanOutcome, PlanSource, Planner, schedule};
