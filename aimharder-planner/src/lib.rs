//! Booking planner for AimHarder
//!
//! Decides *which* class to book on a given day: weekly goals say what time
//! and which class, a days-off list says when to skip, and
//! [`select_class`] finds the matching slot in the day's catalog.
//!
//! # Example
//!
//! ```no_run
//! use aimharder_client::AimHarderClient;
//! use aimharder_planner::{BookingGoals, DaysOff, plan_booking};
//! use chrono::NaiveDate;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let goals = BookingGoals::from_yaml("monday:\n  \"18:15\": Provenza\n")?;
//! let days_off = DaysOff::load("days_off.txt")?;
//! let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
//!
//! days_off.ensure_bookable(day)?;
//! let client = AimHarderClient::new("me@example.com", "secret", 3984, "lahuellacrossfit")?;
//! let classes = client.get_classes(day)?.unwrap_or_default();
//!
//! let class = plan_booking(&goals, &days_off, day, &classes)?;
//! if let Some(class_id) = class.id() {
//!     client.book_class(day, &class_id.to_string(), None)?;
//! }
//! # Ok(())
//! # }
//! ```

mod days_off;
mod error;
mod goals;
mod select;

pub use days_off::DaysOff;
pub use error::PlannerError;
pub use goals::{BookingGoal, BookingGoals};
pub use select::select_class;

use aimharder_client::ClassSlot;
use chrono::NaiveDate;
use tracing::info;

/// Pick the class to book on `date`, or say why there is none
///
/// Checks the days off first, then the goal for that weekday, then the
/// catalog.
pub fn plan_booking<'a>(
    goals: &BookingGoals,
    days_off: &DaysOff,
    date: NaiveDate,
    classes: &'a [ClassSlot],
) -> Result<&'a ClassSlot, PlannerError> {
    days_off.ensure_bookable(date)?;
    let goal = goals.goal_for(date)?;
    let class = select_class(classes, goal)?;
    info!(
        %date,
        time = %goal.time,
        name = %goal.name,
        class_id = ?class.id(),
        "class selected"
    );
    Ok(class)
}
