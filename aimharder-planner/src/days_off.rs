//! Days on which nothing should be booked

use crate::error::PlannerError;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// A set of dates to skip, read from one `YYYY-MM-DD` per line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaysOff {
    dates: BTreeSet<NaiveDate>,
}

impl DaysOff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the days-off list; blank lines are ignored
    pub fn parse(text: &str) -> Result<Self, PlannerError> {
        let dates = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .map(|(line, value)| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                    PlannerError::InvalidDayOff {
                        line,
                        value: value.to_string(),
                    }
                })
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { dates })
    }

    /// Read and parse a days-off file
    ///
    /// # Errors
    ///
    /// `PlannerError::Io` if the file cannot be read, including when it does
    /// not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlannerError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn insert(&mut self, date: NaiveDate) -> bool {
        self.dates.insert(date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }

    /// Fail with `PlannerError::DayOff` if `date` is a day off
    pub fn ensure_bookable(&self, date: NaiveDate) -> Result<(), PlannerError> {
        if self.contains(date) {
            info!(%date, "skipping day off");
            return Err(PlannerError::DayOff { date });
        }
        Ok(())
    }
}
