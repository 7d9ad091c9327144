//! Day-view calendar derived from the task list.
//!
//! Events are never stored. [`project_day`] recomputes them from a task
//! slice each time, and [`CalendarView`] re-runs it whenever the store
//! publishes a new snapshot or the selected day changes.

pub mod projector;
pub mod view;

pub use projector::{CalendarEvent, is_due_on, project_day};
pub use view::CalendarView;
