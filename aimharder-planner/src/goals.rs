//! Weekly booking goals

use crate::error::PlannerError;
use chrono::{Datelike, NaiveDate, Weekday};
use serde_yaml::Value;
use tracing::debug;

/// What to book on a given weekday
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingGoal {
    /// Start time without separators, e.g. `1815` or `900`
    pub time: String,
    /// Text the class name must contain
    pub name: String,
}

impl BookingGoal {
    pub fn new(time: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            time: normalize_time(&time.into()),
            name: name.into(),
        }
    }
}

/// At most one goal per weekday
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingGoals {
    by_weekday: [Option<BookingGoal>; 7],
}

impl BookingGoals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the goal for a weekday, replacing any previous one
    pub fn set(&mut self, weekday: Weekday, goal: BookingGoal) {
        self.by_weekday[weekday.num_days_from_monday() as usize] = Some(goal);
    }

    pub fn get(&self, weekday: Weekday) -> Option<&BookingGoal> {
        self.by_weekday[weekday.num_days_from_monday() as usize].as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.by_weekday.iter().all(Option::is_none)
    }

    /// Parse goals written as YAML
    ///
    /// ```yaml
    /// Monday:
    ///   "9:00": wod
    /// Friday:
    ///   "15:30": functional
    /// ```
    ///
    /// Day names are English and case-insensitive; other keys are skipped.
    /// When a day lists several times, the last one wins.
    ///
    /// # Errors
    ///
    /// `PlannerError::InvalidBookingGoals` if the YAML is malformed, a day is
    /// not a mapping of time to name, or no day is recognised.
    pub fn from_yaml(yaml: &str) -> Result<Self, PlannerError> {
        let document: Value = serde_yaml::from_str(yaml)
            .map_err(|e| PlannerError::InvalidBookingGoals(e.to_string()))?;
        let Value::Mapping(days) = document else {
            return Err(PlannerError::InvalidBookingGoals(
                "expected a mapping of weekday to schedule".to_string(),
            ));
        };

        let mut goals = Self::new();
        for (day, schedule) in &days {
            let day = scalar(day).ok_or_else(|| {
                PlannerError::InvalidBookingGoals(format!("invalid weekday key: {:?}", day))
            })?;
            let Some(weekday) = parse_weekday(&day) else {
                debug!(day = %day, "skipping unknown weekday");
                continue;
            };
            let Value::Mapping(schedule) = schedule else {
                return Err(PlannerError::InvalidBookingGoals(format!(
                    "schedule for {} must map a time to a class name",
                    day
                )));
            };

            for (time, name) in schedule {
                match (scalar(time), scalar(name)) {
                    (Some(time), Some(name)) => goals.set(weekday, BookingGoal::new(time, name)),
                    _ => {
                        return Err(PlannerError::InvalidBookingGoals(format!(
                            "invalid entry for {}: {:?} -> {:?}",
                            day, time, name
                        )));
                    }
                }
            }
        }

        if goals.is_empty() {
            return Err(PlannerError::InvalidBookingGoals(
                "No valid booking goals provided".to_string(),
            ));
        }
        Ok(goals)
    }

    /// The goal for the weekday `date` falls on
    pub fn goal_for(&self, date: NaiveDate) -> Result<&BookingGoal, PlannerError> {
        self.get(date.weekday())
            .ok_or(PlannerError::NoClassOnTargetDayTime { date })
    }
}

/// Strip `:` and spaces, so `"9:00"` becomes `"900"`
fn normalize_time(time: &str) -> String {
    time.chars().filter(|c| *c != ':' && *c != ' ').collect()
}

fn parse_weekday(day: &str) -> Option<Weekday> {
    match day.trim().to_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Strings and numbers as text; `1815` and `"1815"` are the same time
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
