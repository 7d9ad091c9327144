//! Line-oriented command console.
//!
//! The console is the display layer for `wayt`: it validates and trims
//! input, maps 1-based list positions to task ids, drives drag sessions,
//! and renders the task list and the calendar day view as plain text.
//! Every store call it makes has already passed validation.

use std::io::{self, BufRead, Write};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use tracing::{debug, info};
use wayt_model::{NewTask, Priority, Task, TaskPatch, TimeSlot};

use crate::calendar::CalendarView;
use crate::config::AppConfig;
use crate::tasks::{DragSession, ReorderCoordinator, TaskError, TaskStore, validate_title};

/// One parsed console line.
#[derive(Parser, Debug)]
#[command(
    name = "wayt",
    no_binary_name = true,
    disable_version_flag = true,
    color = clap::ColorChoice::Never
)]
struct CommandLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a task to the end of the list.
    Add {
        /// Task title: the words up to the first option, spacing kept.
        title: String,
        /// Due date: YYYY-MM-DD or YYYY-MM-DDTHH:MM.
        #[arg(long)]
        due: Option<String>,
        /// Estimated minutes (defaults to 15).
        #[arg(long, allow_hyphen_values = true)]
        slot: Option<String>,
        /// low, medium or high.
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Show the task list.
    #[command(alias = "ls")]
    List,
    /// Toggle a task between done and not done.
    Done {
        /// Position in the list.
        position: usize,
    },
    /// Delete a task.
    Rm {
        /// Position in the list.
        position: usize,
    },
    /// Change fields of a task.
    Edit {
        /// Position in the list.
        position: usize,
        /// New title: the words up to the next option, spacing kept.
        #[arg(long)]
        title: Option<String>,
        /// New estimate in minutes.
        #[arg(long, allow_hyphen_values = true)]
        slot: Option<String>,
        /// New due date.
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date.
        #[arg(long)]
        clear_due: bool,
        /// New priority.
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Move a task to another position.
    Mv {
        /// Current position.
        from: usize,
        /// New position.
        to: usize,
    },
    /// Show the calendar for the selected day, or jump to DATE first.
    Cal {
        /// YYYY-MM-DD
        date: Option<String>,
    },
    /// Show the next day.
    Next,
    /// Show the previous day.
    Prev,
    /// Show today.
    Today,
    /// Print all tasks as JSON.
    Json,
    /// Leave the console.
    #[command(alias = "exit")]
    Quit,
}

/// Whether the console should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Stop.
    Quit,
}

/// The interactive front-end over a [`TaskStore`] and a [`CalendarView`].
#[derive(Debug)]
pub struct Console<Tz: TimeZone> {
    store: TaskStore,
    calendar: CalendarView<Tz>,
    coordinator: ReorderCoordinator,
    config: AppConfig,
    prompt: bool,
}

impl<Tz> Console<Tz>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    /// Creates a console whose calendar starts on today's date in `tz`.
    pub fn new(config: AppConfig, tz: Tz) -> Self {
        let mut store = TaskStore::new();
        let calendar = CalendarView::starting_today(&mut store, tz);
        Self::from_parts(store, calendar, config)
    }

    /// Creates a console whose calendar starts on `day`.
    pub fn with_day(config: AppConfig, tz: Tz, day: NaiveDate) -> Self {
        let mut store = TaskStore::new();
        let calendar = CalendarView::new(&mut store, tz, day);
        Self::from_parts(store, calendar, config)
    }

    fn from_parts(store: TaskStore, calendar: CalendarView<Tz>, config: AppConfig) -> Self {
        Self {
            store,
            calendar,
            coordinator: ReorderCoordinator::new(),
            config,
            prompt: false,
        }
    }

    /// Prints a `> ` prompt before each line (for interactive terminals).
    #[must_use]
    pub const fn with_prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }

    /// The task store behind the console.
    #[must_use]
    pub const fn store(&self) -> &TaskStore {
        &self.store
    }

    /// The calendar view behind the console.
    #[must_use]
    pub const fn calendar(&self) -> &CalendarView<Tz> {
        &self.calendar
    }

    /// Reads commands from `input` until EOF or `quit`.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from reading `input` or writing `out`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        if self.prompt {
            write!(out, "> ")?;
            out.flush()?;
        }
        for line in input.lines() {
            if self.execute(&line?, out)? == Flow::Quit {
                break;
            }
            if self.prompt {
                write!(out, "> ")?;
                out.flush()?;
            }
        }
        out.flush()
    }

    /// Runs one command line.
    ///
    /// Parse and validation problems are written to `out`; they do not
    /// end the session.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from writing `out`.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Flow::Continue);
        }

        let command = match CommandLine::try_parse_from(split_args(line)) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                write!(out, "{e}")?;
                return Ok(Flow::Continue);
            }
        };
        debug!(?command, "console command");

        let flow = match self.dispatch(command, out) {
            Ok(flow) => flow,
            Err(CommandError::Task(e)) => {
                writeln!(out, "error: {e}")?;
                Flow::Continue
            }
            Err(CommandError::Io(e)) => return Err(e),
        };
        self.calendar.sync();
        Ok(flow)
    }

    fn dispatch<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow, CommandError> {
        match command {
            Command::Add {
                title,
                due,
                slot,
                priority,
            } => {
                let title = validate_title(&title, self.config.max_title_len)?;
                let mut draft = NewTask::new(title.clone());
                if let Some(due) = due {
                    draft = draft.due(self.parse_due(&due)?);
                }
                if let Some(slot) = slot {
                    draft = draft.time_slot(TimeSlot::parse(&slot));
                }
                if let Some(priority) = priority {
                    draft = draft.priority(priority);
                }
                self.store.add_task(draft);
                info!(tasks = self.store.len(), "task added from console");
                writeln!(out, "Added \"{title}\" at position {}", self.store.len())?;
            }
            Command::List => self.print_list(out)?,
            Command::Done { position } => {
                let task = self.task_at(position)?;
                self.store.toggle_task(&task.id);
                let verb = if task.completed { "Reopened" } else { "Completed" };
                writeln!(out, "{verb} \"{}\"", task.title)?;
            }
            Command::Rm { position } => {
                let task = self.task_at(position)?;
                self.store.delete_task(&task.id);
                writeln!(out, "Deleted \"{}\"", task.title)?;
            }
            Command::Edit {
                position,
                title,
                slot,
                due,
                clear_due,
                priority,
            } => {
                let task = self.task_at(position)?;
                let mut patch = TaskPatch::new();
                if let Some(title) = title {
                    patch = patch.title(validate_title(&title, self.config.max_title_len)?);
                }
                if let Some(slot) = slot {
                    patch = patch.time_slot(TimeSlot::parse(&slot));
                }
                if let Some(due) = due {
                    patch = patch.due_date(Some(self.parse_due(&due)?));
                } else if clear_due {
                    patch = patch.due_date(None);
                }
                if let Some(priority) = priority {
                    patch = patch.priority(Some(priority));
                }
                if patch.is_empty() {
                    writeln!(out, "Nothing to change")?;
                } else {
                    self.store.update_task(&task.id, patch);
                    writeln!(out, "Updated \"{}\"", task.title)?;
                }
            }
            Command::Mv { from, to } => {
                let task = self.task_at(from)?;
                if to == 0 || to > self.store.len() {
                    return Err(TaskError::NoSuchPosition(to).into());
                }
                let mut session = DragSession::begin(from - 1);
                session.hover(to - 1);
                let moved = session
                    .finish()
                    .is_some_and(|mv| self.coordinator.commit(&mut self.store, mv));
                if moved {
                    writeln!(out, "Moved \"{}\" to position {to}", task.title)?;
                } else {
                    writeln!(out, "Nothing to move")?;
                }
            }
            Command::Cal { date } => {
                self.calendar.sync();
                if let Some(date) = date {
                    self.calendar.select_day(parse_day(&date)?);
                }
                self.print_calendar(out)?;
            }
            Command::Next => {
                self.calendar.next_day();
                self.print_calendar(out)?;
            }
            Command::Prev => {
                self.calendar.prev_day();
                self.print_calendar(out)?;
            }
            Command::Today => {
                self.calendar.go_to_today();
                self.print_calendar(out)?;
            }
            Command::Json => {
                let json = serde_json::to_string_pretty(&self.store.sorted_view())
                    .map_err(io::Error::other)?;
                writeln!(out, "{json}")?;
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Resolves a 1-based list position to the task shown there.
    fn task_at(&self, position: usize) -> Result<Task, TaskError> {
        position
            .checked_sub(1)
            .and_then(|index| self.store.sorted_view().into_iter().nth(index))
            .ok_or(TaskError::NoSuchPosition(position))
    }

    /// Parses a due date typed in the viewer's timezone.
    fn parse_due(&self, text: &str) -> Result<DateTime<Utc>, TaskError> {
        let naive = parse_naive(text)?;
        self.calendar
            .timezone()
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| TaskError::InvalidDate(text.to_string()))
    }

    fn print_list<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let view = self.store.sorted_view();
        if view.is_empty() {
            return writeln!(out, "No tasks yet.");
        }
        for (index, task) in view.iter().enumerate() {
            let check = if task.completed { "[x]" } else { "[ ]" };
            write!(out, "{:>2}. {check} {} ({})", index + 1, task.title, task.time_slot)?;
            if let Some(due) = task.due_date {
                let due = due.with_timezone(self.calendar.timezone());
                write!(
                    out,
                    " due {} {}",
                    due.format(&self.config.date_format),
                    due.format(&self.config.timestamp_format)
                )?;
            }
            if let Some(priority) = task.priority {
                write!(out, " !{priority}")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn print_calendar<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "== {} ==", self.calendar.day().format(&self.config.date_format))?;
        let events = self.calendar.events();
        if events.is_empty() {
            return writeln!(out, "No events.");
        }
        for event in events {
            writeln!(
                out,
                "{}-{}  {}",
                event.start.format(&self.config.timestamp_format),
                event.end.format(&self.config.timestamp_format),
                event.title
            )?;
        }
        Ok(())
    }
}

/// Failure of a single console command.
#[derive(Debug, thiserror::Error)]
enum CommandError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Splits a console line into arguments for [`CommandLine`].
///
/// Words are whitespace separated, except free text: the `add` title and
/// the value of `--title` run up to the next option of the command and
/// keep their inner spacing. The `add` title goes after `--`, so words that
/// look like flags (`-5`) stay part of it.
fn split_args(line: &str) -> Vec<String> {
    let words = words(line);
    let Some((&(_, name), mut rest)) = words.split_first() else {
        return Vec::new();
    };
    let mut root = CommandLine::command();
    root.build();
    let Some(sub) = root.find_subcommand(name) else {
        return words.iter().map(|&(_, w)| w.to_string()).collect();
    };
    let title_is_positional = sub
        .get_arguments()
        .any(|a| a.get_id() == "title" && a.is_positional());

    let mut args = vec![name.to_string()];
    let mut title = None;
    while let Some((&(_, word), tail)) = rest.split_first() {
        match option(sub, word) {
            Some(arg) if arg.get_id() == "title" && !word.contains('=') => {
                let (text, after) = free_text(line, tail, sub);
                if text.is_empty() {
                    args.push(word.to_string());
                } else {
                    args.push(format!("{word}={text}"));
                }
                rest = after;
            }
            Some(arg) if arg.get_action().takes_values() && !word.contains('=') => {
                args.push(word.to_string());
                match tail.split_first() {
                    Some((&(_, value), after)) => {
                        args.push(value.to_string());
                        rest = after;
                    }
                    None => rest = tail,
                }
            }
            None if title_is_positional && title.is_none() => {
                let (text, after) = free_text(line, rest, sub);
                title = Some(text);
                rest = after;
            }
            _ => {
                args.push(word.to_string());
                rest = tail;
            }
        }
    }
    if let Some(title) = title {
        args.push("--".to_string());
        args.push(title.to_string());
    }
    args
}

/// Whitespace-separated words with their byte offsets in `line`.
fn words(line: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;
    for (i, c) in line.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                words.push((s, &line[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push((s, &line[s..]));
    }
    words
}

/// Takes the leading words that are not options of `sub`. Returns the
/// text they span in `line` and the words after them.
fn free_text<'a, 'w>(
    line: &'a str,
    words: &'w [(usize, &'a str)],
    sub: &clap::Command,
) -> (&'a str, &'w [(usize, &'a str)]) {
    let len = words
        .iter()
        .position(|&(_, w)| option(sub, w).is_some())
        .unwrap_or(words.len());
    let (text, rest) = words.split_at(len);
    match (text.first(), text.last()) {
        (Some(&(start, _)), Some(&(end, last))) => (&line[start..end + last.len()], rest),
        _ => ("", rest),
    }
}

/// Looks up the option `word` names: `--due`, `--due=…` or `-h`.
fn option<'c>(sub: &'c clap::Command, word: &str) -> Option<&'c clap::Arg> {
    if let Some(long) = word.strip_prefix("--") {
        let long = long.split_once('=').map_or(long, |(name, _)| name);
        return sub.get_arguments().find(|a| a.get_long() == Some(long));
    }
    let mut chars = word.strip_prefix('-')?.chars();
    let short = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    sub.get_arguments().find(|a| a.get_short() == Some(short))
}

const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parses `YYYY-MM-DD` (midnight) or `YYYY-MM-DDTHH:MM[:SS]`.
fn parse_naive(text: &str) -> Result<NaiveDateTime, TaskError> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| TaskError::InvalidDate(text.to_string()))
}

fn parse_day(text: &str) -> Result<NaiveDate, TaskError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| TaskError::InvalidDate(text.to_string()))
}
