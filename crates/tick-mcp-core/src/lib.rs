//! Domain types, query engine and batch primitives for tick-mcp.
//!
//! Nothing in this crate performs I/O. Tasks are fetched by `tick-mcp-client`
//! and filtered here; writes are validated here into [`Mutation`]s that the
//! application layer dispatches.

/// Single-or-list normalization and per-item validation.
pub mod batch;
/// Date-filter tokens and their resolution into UTC windows.
pub mod date_window;
/// Error classification.
pub mod error;
/// Task predicate engine.
pub mod filter;
/// Model-facing batch item inputs.
pub mod input;
/// Provider records: tasks, projects, priorities.
pub mod model;
/// Validated write operations.
pub mod mutation;
/// Per-item outcomes and batch reports.
pub mod report;
/// Search-text matching.
pub mod text_matcher;
/// Provider timestamp format.
pub mod wire_time;

pub use batch::{BatchInput, BatchItem, OneOrMany, Prepared, prepare};
pub use date_window::{DateFilter, DateFilterError, DateWindow, parse_timezone};
pub use error::{ErrorKind, ValidationError};
pub use filter::{TaskFilter, filter_tasks};
pub use input::{InputContext, PriorityInput, SubtaskInput, TaskInput, TaskRefInput, TaskUpdateInput};
pub use model::{Priority, Project, ProjectData, ProjectRef, Task, TaskStatus, ViewMode};
pub use mutation::{Mutation, NewProject, NewTask, OperationKind, TaskPatch, TaskRef};
pub use report::{BatchReport, Effect, ItemOutcome};
pub use text_matcher::TextMatcher;
