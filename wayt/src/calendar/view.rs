//! Selected-day calendar state that follows the task store.

use chrono::{NaiveDate, TimeZone, Utc};
use tracing::debug;

use super::projector::{CalendarEvent, project_day};
use crate::tasks::{Snapshot, Subscription, TaskStore};

/// Calendar screen state: a timezone, a selected day, and the events for
/// that day derived from the latest store snapshot.
#[derive(Debug)]
pub struct CalendarView<Tz: TimeZone> {
    tz: Tz,
    day: NaiveDate,
    snapshot: Snapshot,
    updates: Subscription,
    events: Vec<CalendarEvent<Tz>>,
}

impl<Tz: TimeZone> CalendarView<Tz> {
    /// Creates a view of `day` and subscribes it to `store`.
    pub fn new(store: &mut TaskStore, tz: Tz, day: NaiveDate) -> Self {
        let mut view = Self {
            tz,
            day,
            snapshot: store.snapshot(),
            updates: store.subscribe(),
            events: Vec::new(),
        };
        view.recompute();
        view
    }

    /// Creates a view of the current day in `tz`.
    pub fn starting_today(store: &mut TaskStore, tz: Tz) -> Self {
        let day = today_in(&tz);
        Self::new(store, tz, day)
    }

    /// The selected day.
    #[must_use]
    pub const fn day(&self) -> NaiveDate {
        self.day
    }

    /// The timezone events are expressed in.
    #[must_use]
    pub const fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Events for the selected day, sorted by start time.
    #[must_use]
    pub fn events(&self) -> &[CalendarEvent<Tz>] {
        &self.events
    }

    /// Applies any snapshots the store has published since the last call.
    ///
    /// Returns `true` if the events were recomputed.
    pub fn sync(&mut self) -> bool {
        let mut latest = None;
        while let Ok(snapshot) = self.updates.try_recv() {
            latest = Some(snapshot);
        }
        let Some(snapshot) = latest else {
            return false;
        };
        self.snapshot = snapshot;
        self.recompute();
        true
    }

    /// Selects another day.
    pub fn select_day(&mut self, day: NaiveDate) {
        if day != self.day {
            self.day = day;
            self.recompute();
        }
    }

    /// Moves to the following day.
    pub fn next_day(&mut self) {
        if let Some(day) = self.day.succ_opt() {
            self.select_day(day);
        }
    }

    /// Moves to the previous day.
    pub fn prev_day(&mut self) {
        if let Some(day) = self.day.pred_opt() {
            self.select_day(day);
        }
    }

    /// Jumps back to the current day.
    pub fn go_to_today(&mut self) {
        let day = today_in(&self.tz);
        self.select_day(day);
    }

    fn recompute(&mut self) {
        let mut events: Vec<_> = project_day(self.snapshot.tasks(), self.day, &self.tz).collect();
        events.sort_by(|a, b| a.start.cmp(&b.start));
        debug!(
            day = %self.day,
            version = self.snapshot.version(),
            events = events.len(),
            "calendar recomputed"
        );
        self.events = events;
    }
}

fn today_in<Tz: TimeZone>(tz: &Tz) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}
