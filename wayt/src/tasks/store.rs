//! In-memory task store with snapshot subscriptions.
//!
//! `TaskStore` is the single owner of the task collection. Every mutating
//! call completes synchronously and, if it changed anything, queues a new
//! [`Snapshot`] on every live [`Subscription`] before returning. Unknown
//! ids are ignored rather than reported.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::debug;
use wayt_model::{NewTask, Task, TaskId, TaskPatch};

/// Receiving end of a store subscription.
///
/// Drain with `try_recv`; no async runtime is needed.
pub type Subscription = mpsc::UnboundedReceiver<Snapshot>;

/// Immutable view of the task collection at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    version: u64,
    tasks: Arc<[Task]>,
}

impl Snapshot {
    /// Returns an empty snapshot at version 0.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: 0,
            tasks: Arc::from(Vec::new()),
        }
    }

    /// Number of mutations the store had applied when this was taken.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Tasks in storage order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if there are no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Copies `tasks` and sorts them by `order`, oldest first on ties.
///
/// Gaps left by deletions are fine; only relative order matters.
#[must_use]
pub fn sorted_by_order(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| {
        a.order
            .cmp(&b.order)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    sorted
}

/// Owns the task collection and notifies subscribers of changes.
#[derive(Debug, Default)]
pub struct TaskStore {
    /// Tasks in storage order (not necessarily display order).
    tasks: Vec<Task>,
    /// Count of applied mutations.
    version: u64,
    /// Live subscriber channels; closed ones are pruned on publish.
    subscribers: Vec<mpsc::UnboundedSender<Snapshot>>,
}

impl TaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber. It receives one snapshot per mutation
    /// from now on; the current state is available via [`snapshot`](Self::snapshot).
    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Returns an immutable copy of the current collection.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: self.version,
            tasks: Arc::from(self.tasks.as_slice()),
        }
    }

    /// Returns the tasks sorted for display.
    #[must_use]
    pub fn sorted_view(&self) -> Vec<Task> {
        sorted_by_order(&self.tasks)
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Number of tasks in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if the store holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Appends a task after all existing ones and returns its id.
    ///
    /// The new `order` is the task count, or one past the highest order
    /// still in use when deletions have left gaps. The title is stored as
    /// given; callers validate it first.
    pub fn add_task(&mut self, draft: NewTask) -> TaskId {
        let mut id = TaskId::new();
        while self.get(&id).is_some() {
            id = TaskId::new();
        }
        let order = self
            .tasks
            .iter()
            .map(|t| t.order + 1)
            .max()
            .map_or(0, |next| next.max(self.tasks.len()));
        let task = Task::from_draft(draft, id.clone(), order, Utc::now());
        debug!(task_id = %id, order, "task added");
        self.tasks.push(task);
        self.publish();
        id
    }

    /// Flips the completion flag. Returns `false` if `id` is unknown.
    pub fn toggle_task(&mut self, id: &TaskId) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| &t.id == id) else {
            debug!(task_id = %id, "toggle ignored: unknown task");
            return false;
        };
        task.completed = !task.completed;
        self.publish();
        true
    }

    /// Removes a task. Remaining `order` values are left as they are.
    /// Returns `false` if `id` is unknown.
    pub fn delete_task(&mut self, id: &TaskId) -> bool {
        let Some(index) = self.tasks.iter().position(|t| &t.id == id) else {
            debug!(task_id = %id, "delete ignored: unknown task");
            return false;
        };
        self.tasks.remove(index);
        self.publish();
        true
    }

    /// Merges the fields present in `patch` into a task.
    /// Returns `false` if `id` is unknown.
    pub fn update_task(&mut self, id: &TaskId, patch: TaskPatch) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| &t.id == id) else {
            debug!(task_id = %id, "update ignored: unknown task");
            return false;
        };
        patch.apply(task);
        self.publish();
        true
    }

    /// Replaces the whole collection with `tasks`, verbatim.
    ///
    /// The caller is trusted to pass a complete list with contiguous
    /// `order` values; see [`ReorderCoordinator`](super::ReorderCoordinator).
    pub fn reorder_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.publish();
    }

    fn publish(&mut self) {
        self.version += 1;
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
        debug!(
            version = self.version,
            subscribers = self.subscribers.len(),
            "published task snapshot"
        );
    }
}
