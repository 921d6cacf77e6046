//! Gantt layout
//!
//! Converts absolute task dates into chart-relative coordinates, a month
//! axis, a "today" marker and a time-based status per task. Everything here
//! is derived view data, recomputed on every request.

mod layout;
mod render;

pub use layout::{
    DurationMode, GanttLayout, GanttTask, LayoutEngine, MonthBucket, TimeStatus, classify, layout, month_buckets,
};
pub use render::render_text;
