//! `wayt`: a personal task list with a day-view calendar.
//!
//! The [`tasks`] module owns the single source of truth for tasks and the
//! drag-and-drop reorder flow; [`calendar`] projects due tasks onto a day;
//! [`console`] is the command-line front-end over both.

pub mod calendar;
pub mod config;
pub mod console;
pub mod tasks;
