//! Projection of tasks with due dates onto a single calendar day.

use chrono::{DateTime, NaiveDate, TimeZone};
use wayt_model::{Task, TaskId};

/// A display-only calendar entry derived from a task.
#[derive(Debug, Clone)]
pub struct CalendarEvent<Tz: TimeZone> {
    /// Task the event was derived from.
    pub task_id: TaskId,
    /// Task title at projection time.
    pub title: String,
    /// The task's due timestamp in the viewer's timezone.
    pub start: DateTime<Tz>,
    /// `start` plus the task's time slot.
    pub end: DateTime<Tz>,
}

impl<Tz: TimeZone> PartialEq for CalendarEvent<Tz> {
    fn eq(&self, other: &Self) -> bool {
        self.task_id == other.task_id
            && self.title == other.title
            && self.start == other.start
            && self.end == other.end
    }
}

impl<Tz: TimeZone> Eq for CalendarEvent<Tz> {}

/// Returns `true` if the task is due on `day` as seen in `tz`.
///
/// Only the date matters: 00:00 and 23:59 local on the same day both match,
/// whatever the UTC date of the stored timestamp.
pub fn is_due_on<Tz: TimeZone>(task: &Task, day: NaiveDate, tz: &Tz) -> bool {
    task.due_date.is_some_and(|due| due.with_timezone(tz).date_naive() == day)
}

/// Lazily derives the events for `day` from `tasks`.
///
/// Output order follows `tasks` and carries no meaning. Tasks whose end
/// would overflow the representable range are skipped.
pub fn project_day<'a, Tz: TimeZone>(
    tasks: &'a [Task],
    day: NaiveDate,
    tz: &'a Tz,
) -> impl Iterator<Item = CalendarEvent<Tz>> + 'a {
    tasks.iter().filter_map(move |task| {
        let start = task.due_date?.with_timezone(tz);
        if start.date_naive() != day {
            return None;
        }
        let end = start.clone().checked_add_signed(task.time_slot.as_delta())?;
        Some(CalendarEvent {
            task_id: task.id.clone(),
            title: task.title.clone(),
            start,
            end,
        })
    })
}
