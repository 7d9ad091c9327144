//! Task list state for `wayt`.
//!
//! The [`TaskStore`] owns the canonical task collection and publishes an
//! immutable [`Snapshot`] to subscribers after every mutation. The
//! [`reorder`] module turns drag gestures into full, renumbered lists that
//! the store swaps in with a single call.

pub mod reorder;
pub mod store;

pub use reorder::{DragMove, DragSession, ReorderCoordinator, plan_move};
pub use store::{Snapshot, Subscription, TaskStore};

use thiserror::Error;

/// Errors raised while validating user input before it reaches the store.
///
/// The store itself never fails. These are produced by the display layer
/// when it refuses to forward bad input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Task title is empty after trimming.
    #[error("please enter a task title")]
    TitleEmpty,
    /// Task title exceeds the maximum length.
    #[error("task title too long (max {max} characters)")]
    TitleTooLong {
        /// Configured limit in characters.
        max: usize,
    },
    /// No task is displayed at the given 1-based position.
    #[error("no task at position {0}")]
    NoSuchPosition(usize),
    /// A due date could not be understood.
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// Trims a raw title and checks it against `max_len`.
///
/// # Errors
///
/// Returns [`TaskError::TitleEmpty`] for blank input, or
/// [`TaskError::TitleTooLong`] if the trimmed title has more than
/// `max_len` characters.
pub fn validate_title(raw: &str, max_len: usize) -> Result<String, TaskError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TaskError::TitleEmpty);
    }
    if title.chars().count() > max_len {
        return Err(TaskError::TitleTooLong { max: max_len });
    }
    Ok(title.to_string())
}
