//! Domain types for the planner
//!
//! Core value types shared by the allocator, the layout engine and the
//! extractor. None of them are persisted here; the CRUD layer owns storage
//! and hands tasks in as [`TaskRecord`]s with string dates.

mod priority;
mod task;
mod window;

pub use priority::Priority;
pub use task::{MAX_TITLE_CHARS, ScheduledTask, TaskError, TaskRecord, TaskSpec, WorkStatus};
pub use window::{DateWindow, WindowError, parse_iso_date, parse_iso_datetime};
pub(crate) use window::add_days;
