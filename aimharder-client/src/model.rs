//! Values exchanged with the portal

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Message used when the account has no credit left for the class
pub const MESSAGE_BOOKING_FAILED_NO_CREDIT: &str = "No credit available";

/// Message used when the portal gives no usable reason
pub const MESSAGE_BOOKING_FAILED_UNKNOWN: &str = "Unknown error";

/// Format a date the way the portal expects it in queries and forms
pub(crate) fn format_day(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// A bookable class as listed by the portal
///
/// The record is kept exactly as the portal sent it. The fields needed to
/// pick and book a class are read through accessors that return `None` when
/// the portal left them out or sent something unexpected, so one odd record
/// never hides the rest of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassSlot {
    record: Value,
}

impl ClassSlot {
    /// Build a record with the three fields the portal always documents
    pub fn new(id: i64, time_id: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            record: serde_json::json!({
                "id": id,
                "timeid": time_id.into(),
                "className": class_name.into(),
            }),
        }
    }

    /// Class identifier, used when booking; numeric strings are accepted
    pub fn id(&self) -> Option<i64> {
        match self.record.get("id")? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Start time and duration, e.g. `1100_60`
    pub fn time_id(&self) -> Option<&str> {
        self.record.get("timeid").and_then(Value::as_str)
    }

    /// Human-readable class name
    pub fn class_name(&self) -> Option<&str> {
        self.record.get("className").and_then(Value::as_str)
    }

    /// Any upstream field, untouched
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.record.get(key)
    }

    /// The whole upstream record
    pub fn as_json(&self) -> &Value {
        &self.record
    }
}

impl From<Value> for ClassSlot {
    fn from(record: Value) -> Self {
        Self { record }
    }
}

/// A single booking attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    /// Day of the class
    pub date: NaiveDate,
    /// Class identifier from [`ClassSlot::id`]
    pub class_id: String,
    /// Family member to book for; `None` books for the account holder
    pub family_id: Option<String>,
}

impl BookingRequest {
    pub fn new(date: NaiveDate, class_id: impl Into<String>) -> Self {
        Self {
            date,
            class_id: class_id.into(),
            family_id: None,
        }
    }

    /// Book on behalf of a family member instead of the account holder
    pub fn for_family_member(mut self, family_id: impl Into<String>) -> Self {
        self.family_id = Some(family_id.into());
        self
    }

    /// Form fields for the booking endpoint
    pub(crate) fn form(&self, box_id: u64) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("id", self.class_id.clone()),
            ("day", format_day(self.date)),
            ("insist", "0".to_string()),
            ("box", box_id.to_string()),
        ];
        if let Some(family_id) = &self.family_id {
            form.push(("familyId", family_id.clone()));
        }
        form
    }
}

/// Verdict on a login page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// No error text on the page
    Success,
    /// The account is temporarily locked
    TooManyWrongAttempts,
    /// Wrong email or password
    IncorrectCredentials,
    /// Error text we have no rule for
    Unrecognized(String),
}

/// Why a booking was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingFailureKind {
    /// No credit left on the account
    NoCredit,
    /// The portal explained the refusal (e.g. booking too far in advance)
    Rejected,
    /// Anything else
    Unknown,
}

/// A refused booking with a message fit for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingFailure {
    pub kind: BookingFailureKind,
    pub message: String,
}

impl BookingFailure {
    pub fn no_credit() -> Self {
        Self {
            kind: BookingFailureKind::NoCredit,
            message: MESSAGE_BOOKING_FAILED_NO_CREDIT.to_string(),
        }
    }

    pub fn unknown() -> Self {
        Self {
            kind: BookingFailureKind::Unknown,
            message: MESSAGE_BOOKING_FAILED_UNKNOWN.to_string(),
        }
    }

    /// Carry the portal's own explanation
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            kind: BookingFailureKind::Rejected,
            message: message.into(),
        }
    }
}

impl fmt::Display for BookingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Verdict on a booking response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked,
    Failed(BookingFailure),
}
