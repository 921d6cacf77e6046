//! TaskPlanner - conversational task planning and Gantt layout
//!
//! Turns a free-text project conversation into an ordered, dated task list
//! and lays scheduled tasks out on a time axis for display.
//!
//! # Modules
//!
//! - [`domain`] - windows, priorities and task types
//! - [`schedule`] - priority-weighted date allocation
//! - [`extract`] - conversation extraction with template fallback
//! - [`gantt`] - chart coordinates, month axis and text rendering
//! - [`planning`] - the extract-then-allocate pipeline
//! - [`llm`] - completion client trait and providers
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod extract;
pub mod gantt;
pub mod llm;
pub mod planning;
pub mod schedule;

pub use domain::{DateWindow, Priority, ScheduledTask, TaskRecord, TaskSpec, WorkStatus};
pub use extract::{ConversationExtractor, Extraction, TemplateLibrary};
pub use gantt::{GanttLayout, GanttTask, LayoutEngine, TimeStatus};
pub use planning::{PlanOutcome, Planner};
