//! Integration tests for the command console.
//!
//! Drives a [`Console`] with scripted input and checks the rendered
//! output along with the resulting store state.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::io::Cursor;

use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use wayt::config::AppConfig;
use wayt::console::{Console, Flow};
use wayt_model::Priority;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn start_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn make_console() -> Console<Utc> {
    Console::with_day(AppConfig::default(), Utc, start_day())
}

/// Runs a whole script and returns everything printed.
fn run_script<Tz>(console: &mut Console<Tz>, script: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = Vec::new();
    console.run(Cursor::new(script), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

// --- list tests ---

#[test]
fn empty_list() {
    let mut console = make_console();
    assert_eq!(run_script(&mut console, "list\n"), "No tasks yet.\n");
}

#[test]
fn add_and_list() {
    let mut console = make_console();
    let out = run_script(
        &mut console,
        "add Buy milk\nadd Call dentist --due 2024-03-01T09:00 --slot 20 --priority high\nlist\n",
    );
    assert_eq!(
        out,
        "Added \"Buy milk\" at position 1\n\
         Added \"Call dentist\" at position 2\n \
         1. [ ] Buy milk (15m)\n \
         2. [ ] Call dentist (20m) due 2024-03-01 09:00 !high\n"
    );
}

#[test]
fn done_toggles_back_and_forth() {
    let mut console = make_console();
    let out = run_script(&mut console, "add Stretch\ndone 1\nlist\ndone 1\n");
    assert!(out.contains("Completed \"Stretch\""));
    assert!(out.contains(" 1. [x] Stretch"));
    assert!(out.ends_with("Reopened \"Stretch\"\n"));
    assert!(!console.store().sorted_view()[0].completed);
}

#[test]
fn rm_removes_by_position() {
    let mut console = make_console();
    run_script(&mut console, "add A\nadd B\nadd C\nrm 2\n");
    let titles: Vec<_> = console.store().sorted_view().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, ["A", "C"]);
}

#[test]
fn add_after_deletes_reports_last_position() {
    let mut console = make_console();
    let out = run_script(&mut console, "add A\nadd B\nadd C\nrm 1\nrm 1\nadd D\nlist\n");
    assert!(out.contains("Added \"D\" at position 2\n"));
    assert!(out.ends_with(" 1. [ ] C (15m)\n 2. [ ] D (15m)\n"));
}

#[test]
fn titles_keep_spacing_and_hyphen_words() {
    let mut console = make_console();
    run_script(&mut console, "add Do -5   pushups --slot 10\n");
    let task = &console.store().sorted_view()[0];
    assert_eq!(task.title, "Do -5   pushups");
    assert_eq!(task.time_slot.minutes(), 10);
}

// --- edit tests ---

#[test]
fn edit_changes_selected_fields() {
    let mut console = make_console();
    run_script(
        &mut console,
        "add Gym --due 2024-03-01T07:00\nedit 1 --title Morning gym --slot 45 --priority low\n",
    );
    let task = &console.store().sorted_view()[0];
    assert_eq!(task.title, "Morning gym");
    assert_eq!(task.time_slot.minutes(), 45);
    assert_eq!(task.priority, Some(Priority::Low));
    assert!(task.due_date.is_some());

    run_script(&mut console, "edit 1 --clear-due\n");
    assert!(console.store().sorted_view()[0].due_date.is_none());
}

#[test]
fn edit_rejects_blank_title() {
    let mut console = make_console();
    let out = run_script(&mut console, "add Keep\nedit 1 --title   \n");
    assert!(out.contains("error"));
    assert_eq!(console.store().sorted_view()[0].title, "Keep");
}

#[test]
fn overlong_title_is_rejected() {
    let config = AppConfig {
        max_title_len: 5,
        ..AppConfig::default()
    };
    let mut console = Console::with_day(config, Utc, start_day());
    let out = run_script(&mut console, "add Far too long\n");
    assert_eq!(out, "error: task title too long (max 5 characters)\n");
    assert!(console.store().is_empty());
}

#[test]
fn invalid_due_date_is_rejected() {
    let mut console = make_console();
    let out = run_script(&mut console, "add Party --due someday\n");
    assert_eq!(out, "error: invalid date: someday\n");
    assert!(console.store().is_empty());
}

// --- reorder tests ---

#[test]
fn mv_reorders_list() {
    let mut console = make_console();
    let out = run_script(&mut console, "add A\nadd B\nadd C\nmv 1 3\n");
    assert!(out.ends_with("Moved \"A\" to position 3\n"));
    let view = console.store().sorted_view();
    let titles: Vec<_> = view.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["B", "C", "A"]);
    let orders: Vec<_> = view.iter().map(|t| t.order).collect();
    assert_eq!(orders, [0, 1, 2]);
}

// --- calendar tests ---

#[test]
fn calendar_shows_selected_day() {
    let mut console = make_console();
    let out = run_script(
        &mut console,
        "add Call dentist --due 2024-03-01T09:00 --slot 20\ncal\nnext\nprev\n",
    );
    assert!(out.contains("== 2024-03-01 ==\n09:00-09:20  Call dentist\n"));
    assert!(out.contains("== 2024-03-02 ==\nNo events.\n"));
    assert_eq!(console.calendar().day(), start_day());
}

#[test]
fn calendar_jumps_to_date() {
    let mut console = make_console();
    let out = run_script(&mut console, "add Trip --due 2024-04-10\ncal 2024-04-10\n");
    assert!(out.ends_with("== 2024-04-10 ==\n00:00-00:15  Trip\n"));
}

#[test]
fn due_dates_are_read_in_viewer_timezone() {
    let berlin = FixedOffset::east_opt(3600).unwrap();
    let mut console = Console::with_day(AppConfig::default(), berlin, start_day());
    run_script(&mut console, "add Breakfast --due 2024-03-01T00:30\n");
    let due = console.store().sorted_view()[0].due_date.unwrap();
    assert_eq!(due, Utc.with_ymd_and_hms(2024, 2, 29, 23, 30, 0).unwrap());
    assert_eq!(console.calendar().events().len(), 1);
}

// --- session tests ---

#[test]
fn quit_stops_reading() {
    let mut console = make_console();
    let out = run_script(&mut console, "add A\nquit\nadd B\n");
    assert_eq!(out, "Added \"A\" at position 1\n");
    assert_eq!(console.store().len(), 1);
}

#[test]
fn errors_do_not_end_session() {
    let mut console = make_console();
    let mut out = Vec::new();
    assert_eq!(console.execute("done 7", &mut out).unwrap(), Flow::Continue);
    assert_eq!(console.execute("add Still here", &mut out).unwrap(), Flow::Continue);
    assert_eq!(console.store().len(), 1);
}

#[test]
fn json_dumps_sorted_tasks() {
    let mut console = make_console();
    let out = run_script(&mut console, "add A --slot 30\nadd B\nmv 2 1\njson\n");
    let start = out.find('[').unwrap();
    let value: serde_json::Value = serde_json::from_str(&out[start..]).unwrap();
    let tasks = value.as_array().unwrap();
    assert_eq!(tasks[0]["title"], "B");
    assert_eq!(tasks[1]["timeSlot"], 30);
    assert_eq!(tasks[1]["order"], 1);
}
