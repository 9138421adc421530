use crate::error::{Result, TaskError};
use crate::store::{Change, Store};
use crate::task::{parse_deadline, COMPLETED, PENDING};
use chrono::{Local, NaiveDate};
use crossterm::style::{style, Color, Stylize};
use std::io::{BufRead, Write};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Add,
    ListAll,
    ListPending,
    ListCompleted,
    Update,
    Delete,
    Exit,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Add),
            "2" => Some(Self::ListAll),
            "3" => Some(Self::ListPending),
            "4" => Some(Self::ListCompleted),
            "5" => Some(Self::Update),
            "6" => Some(Self::Delete),
            "7" => Some(Self::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Plain,
    Title,
    Success,
    Failure,
    Notice,
}

impl Tone {
    fn color(self) -> Option<Color> {
        match self {
            Tone::Plain => None,
            Tone::Title => Some(Color::Cyan),
            Tone::Success => Some(Color::Green),
            Tone::Failure => Some(Color::Red),
            Tone::Notice => Some(Color::Yellow),
        }
    }
}

/// Text menu over a [`Store`]. Input and output are generic so the loop can
/// be driven by stdin/stdout or by an in-memory script.
pub struct Shell<'a, R, W> {
    store: &'a Store,
    input: R,
    output: W,
    clock: Box<dyn Fn() -> NaiveDate + 'a>,
    styled: bool,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(store: &'a Store, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
            clock: Box::new(|| Local::now().date_naive()),
            styled: false,
        }
    }

    /// Replaces the local-date source used to flag overdue tasks. It is
    /// consulted on every listing.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + 'a) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Colour messages with terminal escape codes.
    pub fn styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    /// Runs until the user picks exit or input ends. Only storage and
    /// terminal failures come back as errors.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.show_menu()?;
            let Some(choice) = self.prompt("Enter your choice: ")? else {
                return self.farewell();
            };

            let flow = match MenuChoice::parse(&choice) {
                Some(MenuChoice::Add) => self.add_task()?,
                Some(MenuChoice::ListAll) => self.view_tasks(None)?,
                Some(MenuChoice::ListPending) => self.view_tasks(Some(PENDING))?,
                Some(MenuChoice::ListCompleted) => self.view_tasks(Some(COMPLETED))?,
                Some(MenuChoice::Update) => self.update_task()?,
                Some(MenuChoice::Delete) => self.delete_task()?,
                Some(MenuChoice::Exit) => Flow::Quit,
                None => {
                    debug!(choice = %choice, "unknown menu choice");
                    self.say(Tone::Failure, "Invalid choice. Please try again.")?;
                    Flow::Continue
                }
            };

            if flow == Flow::Quit {
                return self.farewell();
            }
        }
    }

    fn show_menu(&mut self) -> Result<()> {
        writeln!(self.output)?;
        self.say(Tone::Title, "--- Task Management System ---")?;
        for line in [
            "1. Add a Task",
            "2. View All Tasks",
            "3. View Pending Tasks",
            "4. View Completed Tasks",
            "5. Update a Task",
            "6. Delete a Task",
            "7. Exit",
        ] {
            writeln!(self.output, "{line}")?;
        }
        Ok(())
    }

    fn add_task(&mut self) -> Result<Flow> {
        let Some(description) = self.prompt("Enter task description: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(deadline) = self.prompt("Enter deadline (YYYY-MM-DD, optional): ")? else {
            return Ok(Flow::Quit);
        };
        let deadline = blank_to_none(&deadline);

        self.store.create(&description, deadline)?;
        self.say(Tone::Success, "Task added successfully!")?;
        if let Some(deadline) = deadline.filter(|d| parse_deadline(d).is_none()) {
            self.say(
                Tone::Notice,
                &format!("Note: deadline '{deadline}' is not a YYYY-MM-DD date; stored as typed."),
            )?;
        }
        Ok(Flow::Continue)
    }

    fn view_tasks(&mut self, status: Option<&str>) -> Result<Flow> {
        let tasks = self.store.list(status)?;
        if tasks.is_empty() {
            let what = status.unwrap_or("tasks");
            self.say(Tone::Plain, &format!("No {what} found."))?;
            return Ok(Flow::Continue);
        }

        let today = (self.clock)();
        for task in &tasks {
            write!(self.output, "{task}")?;
            if task.is_overdue(today) {
                self.paint(Tone::Notice, " (overdue)")?;
            }
            writeln!(self.output)?;
        }
        Ok(Flow::Continue)
    }

    fn update_task(&mut self) -> Result<Flow> {
        let Some(id) = self.prompt("Enter the task ID to update: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(description) =
            self.prompt("Enter new description (leave blank to keep current): ")?
        else {
            return Ok(Flow::Quit);
        };
        let Some(status) = self
            .prompt("Enter new status (pending/completed, leave blank to keep current): ")?
        else {
            return Ok(Flow::Quit);
        };

        let Some(id) = self.read_id(&id)? else {
            return Ok(Flow::Continue);
        };
        match self
            .store
            .update(id, blank_to_none(&description), blank_to_none(&status))?
        {
            Change::Applied(_) => self.say(Tone::Success, "Task updated successfully!")?,
            Change::NotFound => self.say(Tone::Failure, "Task not found!")?,
        }
        Ok(Flow::Continue)
    }

    fn delete_task(&mut self) -> Result<Flow> {
        let Some(id) = self.prompt("Enter the task ID to delete: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(id) = self.read_id(&id)? else {
            return Ok(Flow::Continue);
        };
        match self.store.delete(id)? {
            Change::Applied(_) => self.say(Tone::Success, "Task deleted successfully!")?,
            Change::NotFound => self.say(Tone::Failure, "Task not found!")?,
        }
        Ok(Flow::Continue)
    }

    /// Parses an id, reporting a malformed one to the user instead of failing.
    fn read_id(&mut self, text: &str) -> Result<Option<i64>> {
        match parse_id(text) {
            Ok(id) => Ok(Some(id)),
            Err(err @ TaskError::InvalidId(_)) => {
                debug!(input = %text, "rejected task id");
                self.say(Tone::Failure, &err.to_string())?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn farewell(&mut self) -> Result<()> {
        self.say(Tone::Plain, "Exiting the application. Goodbye!")?;
        self.output.flush()?;
        Ok(())
    }

    /// Returns `None` once input is exhausted. A line that is not UTF-8 is
    /// reported and the same prompt is shown again.
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        loop {
            write!(self.output, "{message}")?;
            self.output.flush()?;

            let mut bytes = Vec::new();
            if self.input.read_until(b'\n', &mut bytes)? == 0 {
                writeln!(self.output)?;
                return Ok(None);
            }
            while matches!(bytes.last(), Some(b'\n' | b'\r')) {
                bytes.pop();
            }

            match String::from_utf8(bytes) {
                Ok(line) => return Ok(Some(line)),
                Err(err) => {
                    debug!(error = %err.utf8_error(), "rejected non-UTF-8 input");
                    self.say(
                        Tone::Failure,
                        "Input is not valid UTF-8 text. Please try again.",
                    )?;
                }
            }
        }
    }

    fn say(&mut self, tone: Tone, text: &str) -> Result<()> {
        self.paint(tone, text)?;
        writeln!(self.output)?;
        Ok(())
    }

    fn paint(&mut self, tone: Tone, text: &str) -> Result<()> {
        match tone.color().filter(|_| self.styled) {
            Some(color) => write!(self.output, "{}", style(text).with(color))?,
            None => write!(self.output, "{text}")?,
        }
        Ok(())
    }
}

pub fn parse_id(text: &str) -> Result<i64> {
    let text = text.trim();
    text.parse()
        .map_err(|_| TaskError::InvalidId(text.to_string()))
}

fn blank_to_none(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
