//! Shared data model for `wayt`: tasks, identifiers, and edit payloads.

pub mod task;

pub use task::{
    MAX_TASK_TITLE_LENGTH, NewTask, ParsePriorityError, Priority, Task, TaskId, TaskPatch,
    TimeSlot,
};
