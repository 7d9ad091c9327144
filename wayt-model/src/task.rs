//! Task model types for `wayt`.
//!
//! Defines the [`Task`] record owned by the task store, its identifier,
//! the duration estimate used for calendar placement, and the two input
//! shapes callers hand to the store: [`NewTask`] for creation and
//! [`TaskPatch`] for partial edits.

use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default maximum task title length in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 256;

/// Unique identifier for a task, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Estimated duration of a task in whole minutes. Always positive.
///
/// Any input that is missing, non-numeric, zero or negative resolves to
/// [`TimeSlot::DEFAULT`] instead of being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TimeSlot(NonZeroU32);

impl TimeSlot {
    /// Minutes used when no valid estimate was given.
    pub const DEFAULT_MINUTES: u32 = 15;

    /// The 15 minute default slot.
    pub const DEFAULT: Self = match NonZeroU32::new(Self::DEFAULT_MINUTES) {
        Some(minutes) => Self(minutes),
        None => panic!("default time slot must be non-zero"),
    };

    /// Builds a slot from a signed minute count, falling back to the
    /// default for zero, negative, or out-of-range values.
    #[must_use]
    pub fn from_minutes(minutes: i64) -> Self {
        u32::try_from(minutes)
            .ok()
            .and_then(NonZeroU32::new)
            .map_or(Self::DEFAULT, Self)
    }

    /// Resolves an optional minute count, defaulting when absent.
    #[must_use]
    pub fn from_input(minutes: Option<i64>) -> Self {
        minutes.map_or(Self::DEFAULT, Self::from_minutes)
    }

    /// Parses free-form user input. Never fails.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self::from_input(input.trim().parse::<i64>().ok())
    }

    /// Returns the slot length in minutes.
    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.0.get()
    }

    /// Returns the slot length as a chrono delta.
    #[must_use]
    pub fn as_delta(self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.minutes()))
    }
}

impl Default for TimeSlot {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::from_minutes)
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}m", self.minutes())
    }
}

/// Optional importance tag shown next to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal importance.
    Medium,
    /// Do this first.
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Error returned when a priority name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority {0:?} (expected low, medium or high)")]
pub struct ParsePriorityError(String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier (UUID v7, time-ordered).
    pub id: TaskId,
    /// Display title.
    pub title: String,
    /// Whether the user has checked the task off.
    pub completed: bool,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// Last time a reorder touched this task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Optional due timestamp; places the task on the calendar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Estimated duration.
    pub time_slot: TimeSlot,
    /// Optional importance tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Position among all tasks.
    pub order: usize,
}

impl Task {
    /// Materialises a draft into a task with the given identity and position.
    #[must_use]
    pub fn from_draft(draft: NewTask, id: TaskId, order: usize, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            completed: false,
            created_at: now,
            updated_at: None,
            due_date: draft.due_date,
            time_slot: draft.time_slot,
            priority: draft.priority,
            order,
        }
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Title, already trimmed by the caller.
    pub title: String,
    /// Optional due timestamp.
    pub due_date: Option<DateTime<Utc>>,
    /// Estimated duration.
    pub time_slot: TimeSlot,
    /// Optional importance tag.
    pub priority: Option<Priority>,
}

impl NewTask {
    /// Starts a draft with the given title and default settings.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            due_date: None,
            time_slot: TimeSlot::DEFAULT,
            priority: None,
        }
    }

    /// Sets the due timestamp.
    #[must_use]
    pub fn due(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the duration estimate from raw minutes (invalid values default).
    #[must_use]
    pub fn minutes(mut self, minutes: i64) -> Self {
        self.time_slot = TimeSlot::from_minutes(minutes);
        self
    }

    /// Sets the duration estimate.
    #[must_use]
    pub fn time_slot(mut self, time_slot: TimeSlot) -> Self {
        self.time_slot = time_slot;
        self
    }

    /// Sets the priority tag.
    #[must_use]
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// A partial update. Only fields that are `Some` are written.
///
/// Nested options (`due_date`, `priority`) distinguish "leave alone"
/// (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<String>,
    /// New completion flag.
    pub completed: Option<bool>,
    /// New or cleared due timestamp.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// New duration estimate.
    pub time_slot: Option<TimeSlot>,
    /// New or cleared priority.
    pub priority: Option<Option<Priority>>,
    /// Explicit position override.
    pub order: Option<usize>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the completion flag.
    #[must_use]
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Sets or clears the due timestamp.
    #[must_use]
    pub fn due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the duration estimate.
    #[must_use]
    pub fn time_slot(mut self, time_slot: TimeSlot) -> Self {
        self.time_slot = Some(time_slot);
        self
    }

    /// Sets or clears the priority.
    #[must_use]
    pub fn priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the position.
    #[must_use]
    pub fn order(mut self, order: usize) -> Self {
        self.order = Some(order);
        self
    }

    /// Returns `true` if the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.completed.is_none()
            && self.due_date.is_none()
            && self.time_slot.is_none()
            && self.priority.is_none()
            && self.order.is_none()
    }

    /// Merges the provided fields into `task`.
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(time_slot) = self.time_slot {
            task.time_slot = time_slot;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(order) = self.order {
            task.order = order;
        }
    }
}
