//! Drag-and-drop reordering.
//!
//! A [`DragSession`] follows one gesture and yields at most one
//! [`DragMove`] when it ends. The [`ReorderCoordinator`] turns that move
//! into a complete, renumbered task list and hands it to the store in a
//! single [`TaskStore::reorder_tasks`] call, so subscribers never observe
//! duplicate or missing `order` values.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use wayt_model::Task;

use super::store::TaskStore;

/// Final source and destination of a drag, as indices into the sorted view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragMove {
    /// Index the dragged row started at.
    pub from: usize,
    /// Index the dragged row was dropped at.
    pub to: usize,
}

impl DragMove {
    /// Creates a move.
    #[must_use]
    pub const fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// The move that undoes this one.
    #[must_use]
    pub const fn inverse(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }

    /// Returns `true` if the row ends where it started.
    #[must_use]
    pub const fn is_noop(self) -> bool {
        self.from == self.to
    }
}

/// Tracks one drag gesture.
///
/// Gesture layers report many intermediate positions. Only the origin and
/// the last reported target matter; nothing is committed until
/// [`finish`](Self::finish).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragSession {
    origin: Option<usize>,
    target: Option<usize>,
}

impl DragSession {
    /// Starts a drag on the row at `from`.
    #[must_use]
    pub const fn begin(from: usize) -> Self {
        Self {
            origin: Some(from),
            target: Some(from),
        }
    }

    /// Records an intermediate `(from, to)` report. The first `from` seen
    /// is kept as the origin.
    pub const fn track(&mut self, from: usize, to: usize) {
        if self.origin.is_none() {
            self.origin = Some(from);
        }
        self.target = Some(to);
    }

    /// Records the row currently hovered.
    pub const fn hover(&mut self, to: usize) {
        self.target = Some(to);
    }

    /// Returns `true` once a drag has started.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.origin.is_some()
    }

    /// Abandons the gesture.
    pub const fn cancel(&mut self) {
        self.origin = None;
        self.target = None;
    }

    /// Ends the gesture. Yields a move only if the row actually moved.
    #[must_use]
    pub fn finish(self) -> Option<DragMove> {
        let mv = DragMove::new(self.origin?, self.target?);
        (!mv.is_noop()).then_some(mv)
    }
}

/// Computes the list that results from moving `view[from]` to `to`.
///
/// `view` must be in display order. The moved row is spliced out and
/// reinserted, every row gets `order = index`, and every row is stamped
/// with `now`. Returns `None` when there is nothing to do: `from == to`,
/// fewer than two rows, or an index out of range.
#[must_use]
pub fn plan_move(view: &[Task], from: usize, to: usize, now: DateTime<Utc>) -> Option<Vec<Task>> {
    if from == to || view.len() < 2 {
        return None;
    }
    if from >= view.len() || to >= view.len() {
        warn!(from, to, len = view.len(), "reorder ignored: index out of range");
        return None;
    }

    let mut list = view.to_vec();
    let moved = list.remove(from);
    list.insert(to, moved);
    for (index, task) in list.iter_mut().enumerate() {
        task.order = index;
        task.updated_at = Some(now);
    }
    Some(list)
}

/// Commits drag moves to a [`TaskStore`].
#[derive(Debug, Clone, Copy)]
pub struct ReorderCoordinator {
    clock: fn() -> DateTime<Utc>,
}

impl Default for ReorderCoordinator {
    fn default() -> Self {
        Self { clock: Utc::now }
    }
}

impl ReorderCoordinator {
    /// Creates a coordinator that stamps rows with the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a coordinator with a custom time source.
    #[must_use]
    pub const fn with_clock(clock: fn() -> DateTime<Utc>) -> Self {
        Self { clock }
    }

    /// Moves the row at `from` to `to` in the store's sorted view.
    ///
    /// Returns `true` if the store was rewritten.
    pub fn move_task(&self, store: &mut TaskStore, from: usize, to: usize) -> bool {
        let view = store.sorted_view();
        let Some(list) = plan_move(&view, from, to, (self.clock)()) else {
            return false;
        };
        debug!(from, to, tasks = list.len(), "committing reorder");
        store.reorder_tasks(list);
        true
    }

    /// Commits the result of a finished [`DragSession`].
    pub fn commit(&self, store: &mut TaskStore, mv: DragMove) -> bool {
        self.move_task(store, mv.from, mv.to)
    }
}
