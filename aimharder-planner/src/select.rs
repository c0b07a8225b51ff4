//! Picking the class that matches a goal

use crate::error::PlannerError;
use crate::goals::BookingGoal;
use aimharder_client::ClassSlot;

/// Find the first class at the goal's time whose name contains the goal's name
///
/// The goal time only has to appear somewhere in `timeid` (`1700` matches
/// `1700_60`); the name is compared case-insensitively.
///
/// # Errors
///
/// * `PlannerError::BoxClosed` - `classes` is empty
/// * `PlannerError::NoBookingGoal` - no class matches
pub fn select_class<'a>(
    classes: &'a [ClassSlot],
    goal: &BookingGoal,
) -> Result<&'a ClassSlot, PlannerError> {
    if classes.is_empty() {
        return Err(PlannerError::BoxClosed);
    }

    let name = goal.name.to_lowercase();
    classes
        .iter()
        .filter(|class| class.time_id().is_some_and(|time| time.contains(&goal.time)))
        .find(|class| {
            class
                .class_name()
                .is_some_and(|class_name| class_name.to_lowercase().contains(&name))
        })
        .ok_or_else(|| PlannerError::NoBookingGoal {
            name: goal.name.clone(),
            time: goal.time.clone(),
        })
}
