//! Error types for the planner

use chrono::NaiveDate;
use thiserror::Error;

/// Reasons a booking goal cannot be turned into a class to book
#[derive(Debug, Error)]
pub enum PlannerError {
    /// The goals document is unreadable or names no usable day
    #[error("Invalid booking goals: {0}")]
    InvalidBookingGoals(String),

    /// No goal is set for the weekday of `date`
    #[error(
        "There is no class to book on {}. Either the time or the name could not be found in the booking goals.",
        .date.format("%A, %Y-%m-%d")
    )]
    NoClassOnTargetDayTime { date: NaiveDate },

    /// The box has no classes at all that day
    #[error("Box is closed")]
    BoxClosed,

    /// Classes exist but none matches the goal
    #[error("No class with the text `{name}` in its name at time `{time}`")]
    NoBookingGoal { name: String, time: String },

    /// `date` is listed as a day off
    #[error(
        "The date {} is among your days off list so don't book anything",
        .date.format("%A, %Y-%m-%d")
    )]
    DayOff { date: NaiveDate },

    /// A days-off line is not a `YYYY-MM-DD` date
    #[error("Invalid day off on line {line}: {value:?}")]
    InvalidDayOff { line: usize, value: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
