use chrono::NaiveDate;
use std::fmt;

pub const PENDING: &str = "pending";
pub const COMPLETED: &str = "completed";

const DEADLINE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    pub description: String,
    pub deadline: Option<String>,
    pub status: String, // "pending", "completed", or whatever was typed
}

impl Task {
    /// The deadline as a calendar date, when it was typed as `YYYY-MM-DD`.
    pub fn deadline_date(&self) -> Option<NaiveDate> {
        self.deadline.as_deref().and_then(parse_deadline)
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != COMPLETED && self.deadline_date().is_some_and(|d| d < today)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Description: {}, Deadline: {}, Status: {}",
            self.id,
            self.description,
            self.deadline.as_deref().unwrap_or("None"),
            self.status
        )
    }
}

pub fn parse_deadline(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DEADLINE_FORMAT).ok()
}
